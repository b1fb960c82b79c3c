use crate::fixtures::test_app::TestApp;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

type Socket = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn connect(app: &TestApp, token: &str) -> Socket {
    let (mut ws, _) = tokio_tungstenite::connect_async(app.ws_url(token))
        .await
        .expect("WS connect failed");

    let hello = next_json(&mut ws).await;
    assert_eq!(hello["type"], "connected");
    ws
}

async fn next_json(ws: &mut Socket) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timeout waiting for WS message")
        .unwrap()
        .unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn connect_requires_valid_token() {
    let app = TestApp::spawn().await;
    let result = tokio_tungstenite::connect_async(app.ws_url("garbage")).await;
    assert!(result.is_err(), "upgrade with a bad token must be refused");
}

#[tokio::test]
async fn ping_gets_pong() {
    let app = TestApp::spawn().await;
    let user = app.create_user("pinger@acme.com");
    let mut ws = connect(&app, &user.access_token).await;

    ws.send(Message::text(r#"{"type":"ping"}"#.to_string()))
        .await
        .unwrap();
    let pong = next_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
}

#[tokio::test]
async fn whatsapp_message_is_pushed_live() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("live").await;
    let mut ws = connect(&app, &org.member.access_token).await;

    let status = app
        .post_event(
            &org.id,
            &org.owner,
            serde_json::json!({
                "type": "whatsapp_message",
                "recipient_id": org.member.id,
                "contact_name": "João Silva",
                "preview": "Oi, tudo bem?",
                "contact_id": "contact-456",
                "message_id": "msg-789",
            }),
        )
        .await;
    assert_eq!(status, 202);

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["type"], "notification:new");
    let data = &frame["data"];
    assert_eq!(data["type"], "WHATSAPP_MESSAGE");
    assert_eq!(data["title"], "Nova mensagem de João Silva");
    assert_eq!(data["body"], "Oi, tudo bem?");
    assert_eq!(data["enable_sound"], true);
    assert_eq!(data["is_muted"], false);
    assert!(data["id"].as_str().is_some_and(|id| id.len() == 24));
}

#[tokio::test]
async fn quiet_hours_mark_but_still_deliver() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("quiet").await;

    // Equal bounds cover the whole day, so the test does not depend on the clock.
    app.auth_put("/api/notification/preferences", &org.member.access_token)
        .json(&serde_json::json!({
            "enable_sound": false,
            "mute_from": "00:00",
            "mute_to": "00:00",
        }))
        .send()
        .await
        .unwrap();

    let mut ws = connect(&app, &org.member.access_token).await;
    app.post_event(
        &org.id,
        &org.owner,
        serde_json::json!({
            "type": "contact_updated",
            "recipient_id": org.member.id,
            "contact_name": "Maria",
            "contact_id": "c-1",
        }),
    )
    .await;

    let frame = next_json(&mut ws).await;
    assert_eq!(frame["data"]["is_muted"], true);
    assert_eq!(frame["data"]["enable_sound"], false);

    let unread: Value = app
        .auth_get("/api/notification/unread-count", &org.member.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unread["count"], 1);
}

#[tokio::test]
async fn every_session_of_the_recipient_receives() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("fanout").await;
    let mut tab_one = connect(&app, &org.member.access_token).await;
    let mut tab_two = connect(&app, &org.member.access_token).await;
    let mut bystander = connect(&app, &org.admin.access_token).await;

    let health: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["connected_users"], 2);
    assert_eq!(health["connections"], 3);

    app.post_event(
        &org.id,
        &org.owner,
        serde_json::json!({
            "type": "deal_created",
            "recipient_id": org.member.id,
            "deal_name": "Acme",
            "deal_id": "d-1",
        }),
    )
    .await;

    for ws in [&mut tab_one, &mut tab_two] {
        let frame = next_json(ws).await;
        assert_eq!(frame["data"]["title"], "Novo negócio: Acme");
    }

    let nothing = tokio::time::timeout(Duration::from_millis(300), bystander.next()).await;
    assert!(nothing.is_err(), "other users must not receive the notification");
}

#[tokio::test]
async fn offline_recipient_still_gets_stored_notification() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("offline").await;

    app.post_event(
        &org.id,
        &org.owner,
        serde_json::json!({
            "type": "deal_created",
            "recipient_id": org.member.id,
            "deal_name": "Acme",
            "deal_id": "d-1",
        }),
    )
    .await;

    let unread: Value = app
        .auth_get("/api/notification/unread-count", &org.member.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unread["count"], 1);
}
