use crate::fixtures::test_app::TestApp;
use serde_json::Value;
use tokio_test::assert_ok;

async fn titles(app: &TestApp, token: &str) -> Vec<String> {
    let items: Vec<Value> = app
        .auth_get("/api/notification", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    items
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn every_event_kind_renders_its_template() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("templates").await;
    let to = org.member.id.clone();

    let events = [
        serde_json::json!({
            "type": "kanban_move",
            "recipient_id": to,
            "deal_name": "Acme",
            "from_stage": "Lead",
            "to_stage": "Proposta",
            "deal_id": "d-1",
        }),
        serde_json::json!({
            "type": "contact_created",
            "recipient_id": to,
            "contact_name": "Maria",
            "contact_id": "c-1",
        }),
        serde_json::json!({
            "type": "contact_updated",
            "recipient_id": to,
            "contact_name": "Maria",
            "contact_id": "c-1",
        }),
        serde_json::json!({
            "type": "deal_created",
            "recipient_id": to,
            "deal_name": "Acme",
            "deal_id": "d-1",
        }),
        serde_json::json!({
            "type": "deal_updated",
            "recipient_id": to,
            "deal_name": "Acme",
            "deal_id": "d-1",
        }),
    ];
    for event in events {
        assert_eq!(app.post_event(&org.id, &org.viewer, event).await, 202);
    }

    let got = titles(&app, &org.member.access_token).await;
    assert_eq!(
        got,
        vec![
            "Negócio atualizado: Acme",
            "Novo negócio: Acme",
            "Contato atualizado: Maria",
            "Novo contato: Maria",
            "Card movido: Acme",
        ]
    );

    let items: Vec<Value> = app
        .auth_get("/api/notification?limit=5", &org.member.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let moved = &items[4];
    assert_eq!(moved["type"], "KANBAN_MOVE");
    assert_eq!(moved["body"], "Lead → Proposta");
    assert_eq!(moved["entity_type"], "card");
}

#[tokio::test]
async fn caller_and_recipient_must_be_members() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("event-scope").await;
    let stranger = app.create_user("stranger@event-scope.com");

    let to_stranger = serde_json::json!({
        "type": "contact_created",
        "recipient_id": stranger.id,
        "contact_name": "Maria",
        "contact_id": "c-1",
    });
    assert_eq!(app.post_event(&org.id, &org.owner, to_stranger).await, 403);

    let from_stranger = serde_json::json!({
        "type": "contact_created",
        "recipient_id": org.member.id,
        "contact_name": "Maria",
        "contact_id": "c-1",
    });
    assert_eq!(app.post_event(&org.id, &stranger, from_stranger).await, 403);

    assert!(titles(&app, &stranger.access_token).await.is_empty());
    assert!(titles(&app, &org.member.access_token).await.is_empty());
}

#[tokio::test]
async fn dispatch_failure_does_not_fail_the_request() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("swallowed").await;

    // An empty preview makes an invalid notification; the event is still accepted.
    let status = app
        .post_event(
            &org.id,
            &org.owner,
            serde_json::json!({
                "type": "whatsapp_message",
                "recipient_id": org.member.id,
                "contact_name": "João Silva",
                "preview": "",
                "contact_id": "contact-456",
                "message_id": "msg-789",
            }),
        )
        .await;
    assert_eq!(status, 202);
    assert!(titles(&app, &org.member.access_token).await.is_empty());
}

#[tokio::test]
async fn dispatcher_can_be_driven_directly() {
    let app = TestApp::spawn().await;
    let user = app.create_user("direct@acme.com");

    app.state
        .dispatcher
        .emit_contact_created(user.user_id, "Carlos", "c-9")
        .await;

    let count = assert_ok!(app.state.notifications.count_unread(user.user_id).await);
    assert_eq!(count, 1);
    assert_eq!(titles(&app, &user.access_token).await, vec!["Novo contato: Carlos"]);
}
