use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn any_member_lists_members() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("roster").await;

    let members: Vec<Value> = app
        .auth_get(&format!("/api/org/{}/member", org.id), &org.viewer.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(members.len(), 4);

    let stranger = app.create_user("stranger@roster.com");
    let resp = app
        .auth_get(&format!("/api/org/{}/member", org.id), &stranger.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn read_only_roles_cannot_add() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("readonly").await;
    let newcomer = app.create_user("new@readonly.com");

    for caller in [&org.member, &org.viewer] {
        let resp = app
            .auth_post(&format!("/api/org/{}/member", org.id), &caller.access_token)
            .json(&serde_json::json!({ "user_id": newcomer.id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 403);
    }

    // Admin may add, and the role defaults to member.
    let resp = app
        .auth_post(&format!("/api/org/{}/member", org.id), &org.admin.access_token)
        .json(&serde_json::json!({ "user_id": newcomer.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let member: Value = resp.json().await.unwrap();
    assert_eq!(member["role"], "member");
    assert_eq!(member["invited_by"], org.admin.id.as_str());
}

#[tokio::test]
async fn adding_existing_member_conflicts() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("dupe-member").await;

    let resp = app
        .auth_post(&format!("/api/org/{}/member", org.id), &org.owner.access_token)
        .json(&serde_json::json!({ "user_id": org.member.id, "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn admin_cannot_grant_owner() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("no-escalation").await;
    let newcomer = app.create_user("new@no-escalation.com");

    let resp = app
        .auth_post(&format!("/api/org/{}/member", org.id), &org.admin.access_token)
        .json(&serde_json::json!({ "user_id": newcomer.id, "role": "owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn remove_member_rules() {
    let app = TestApp::spawn().await;
    let org = app.seed_organization("removal").await;
    let base = format!("/api/org/{}/member", org.id);

    // Members cannot remove anyone.
    let resp = app
        .auth_delete(&format!("{}/{}", base, org.viewer.id), &org.member.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // Admin removes the viewer.
    let resp = app
        .auth_delete(&format!("{}/{}", base, org.viewer.id), &org.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    // Gone now.
    let resp = app
        .auth_delete(&format!("{}/{}", base, org.viewer.id), &org.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // Admin may not remove the owner; the owner may not remove themself as the last owner.
    let resp = app
        .auth_delete(&format!("{}/{}", base, org.owner.id), &org.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&format!("{}/{}", base, org.owner.id), &org.owner.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}
