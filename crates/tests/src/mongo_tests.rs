//! The same flows as the in-memory suites, run against the Mongo DAOs.
//!
//! Needs a running MongoDB: `cargo test -p kanflow-tests -- --ignored`.

use crate::fixtures::test_app::TestApp;
use bson::{DateTime, oid::ObjectId};
use kanflow_db::models::{MemberRole, Organization, OrganizationMember, Plan};
use kanflow_services::dao::{DaoError, OrganizationDao};
use kanflow_services::store::OrganizationStore;
use serde_json::Value;

fn organization(slug: &str) -> Organization {
    let now = DateTime::now();
    Organization {
        id: None,
        name: "Acme".to_string(),
        slug: slug.to_string(),
        description: None,
        website: None,
        phone: None,
        email: None,
        owner_id: ObjectId::new(),
        plan: Plan::Starter,
        created_at: now,
        updated_at: now,
    }
}

async fn unread(app: &TestApp, token: &str) -> u64 {
    let body: Value = app
        .auth_get("/api/notification/unread-count", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["count"].as_u64().unwrap()
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn unique_indexes_surface_as_duplicate_key() {
    let app = TestApp::spawn_mongo().await;
    let db = kanflow_db::connect(&app.settings.database).await.unwrap();
    let dao = OrganizationDao::new(&db);

    let organization_id = dao.insert_organization(&organization("acme")).await.unwrap();
    let err = dao.insert_organization(&organization("acme")).await.unwrap_err();
    assert!(matches!(err, DaoError::DuplicateKey(_)), "got {err:?}");

    let member = OrganizationMember {
        id: None,
        organization_id,
        user_id: ObjectId::new(),
        role: MemberRole::Member,
        invited_by: None,
        joined_at: DateTime::now(),
    };
    dao.insert_membership(&member).await.unwrap();
    let err = dao.insert_membership(&member).await.unwrap_err();
    assert!(matches!(err, DaoError::DuplicateKey(_)), "got {err:?}");
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn duplicate_slug_is_rejected_over_http() {
    let app = TestApp::spawn_mongo().await;
    let first = app.create_user("first@acme.com");
    let second = app.create_user("second@acme.com");
    app.create_organization(&first, "Acme", "acme").await;

    let resp = app
        .auth_post("/api/org", &second.access_token)
        .json(&serde_json::json!({ "name": "Other Acme", "slug": "acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn mark_read_is_idempotent() {
    let app = TestApp::spawn_mongo().await;
    let user = app.create_user("reader@acme.com");
    for name in ["Ana", "Bruno", "Carla"] {
        app.state
            .dispatcher
            .emit_contact_created(user.user_id, name, "c-1")
            .await;
    }
    assert_eq!(unread(&app, &user.access_token).await, 3);

    let items: Vec<Value> = app
        .auth_get("/api/notification", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items[0]["title"], "Novo contato: Carla");
    let first = items[0]["id"].as_str().unwrap().to_string();

    for expected in [1, 0] {
        let body: Value = app
            .auth_put(&format!("/api/notification/{}/read", first), &user.access_token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["updated"], expected);
    }
    assert_eq!(unread(&app, &user.access_token).await, 2);

    let ids: Vec<&str> = items.iter().map(|n| n["id"].as_str().unwrap()).collect();
    let body: Value = app
        .auth_put("/api/notification/read", &user.access_token)
        .json(&serde_json::json!({ "ids": ids }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["updated"], 2);
    assert_eq!(unread(&app, &user.access_token).await, 0);
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn concurrent_preference_updates_both_stick() {
    let app = TestApp::spawn_mongo().await;
    let user = app.create_user("prefs@acme.com");

    let sound = app
        .auth_put("/api/notification/preferences", &user.access_token)
        .json(&serde_json::json!({ "enable_sound": false }))
        .send();
    let kanban = app
        .auth_put("/api/notification/preferences", &user.access_token)
        .json(&serde_json::json!({ "kanban_move": false, "mute_from": "22:00" }))
        .send();
    let (a, b) = tokio::join!(sound, kanban);
    assert_eq!(a.unwrap().status().as_u16(), 200);
    assert_eq!(b.unwrap().status().as_u16(), 200);

    let prefs: Value = app
        .auth_get("/api/notification/preferences", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prefs["enable_sound"], false);
    assert_eq!(prefs["kanban_move"], false);
    assert_eq!(prefs["whatsapp_message"], true);
    assert_eq!(prefs["mute_from"], "22:00");
    assert!(prefs["mute_to"].is_null());
}

#[tokio::test]
#[ignore = "requires MongoDB"]
async fn invitation_is_single_use() {
    let app = TestApp::spawn_mongo().await;
    let org = app.seed_organization("mongo-invites").await;

    let invitation: Value = app
        .auth_post(&format!("/api/org/{}/invite", org.id), &org.owner.access_token)
        .json(&serde_json::json!({ "email": "ana@mongo-invites.com", "role": "admin" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = invitation["token"].as_str().unwrap();

    let ana = app.create_user("ana@mongo-invites.com");
    let resp = app
        .auth_post(&format!("/api/invite/{}/accept", token), &ana.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let bruno = app.create_user("bruno@mongo-invites.com");
    let resp = app
        .auth_post(&format!("/api/invite/{}/accept", token), &bruno.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let listed: Vec<Value> = app
        .auth_get(&format!("/api/org/{}/invite", org.id), &org.owner.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed[0]["status"], "accepted");

    let members: Vec<Value> = app
        .auth_get(&format!("/api/org/{}/member", org.id), &ana.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(members.len(), 5);
}
