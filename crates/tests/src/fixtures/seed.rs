use bson::oid::ObjectId;
use serde_json::Value;

use super::test_app::TestApp;

pub struct SeededUser {
    pub id: String,
    pub user_id: ObjectId,
    pub email: String,
    pub access_token: String,
}

/// An organization with one user per role.
pub struct SeededOrganization {
    pub id: String,
    pub slug: String,
    pub owner: SeededUser,
    pub admin: SeededUser,
    pub member: SeededUser,
    pub viewer: SeededUser,
}

impl TestApp {
    /// Mints an access token for a fresh user id. Sign-in is handled upstream
    /// in production, so tests only need a valid token.
    pub fn create_user(&self, email: &str) -> SeededUser {
        let user_id = ObjectId::new();
        let access_token = self
            .state
            .auth
            .generate_access_token(user_id, email)
            .expect("Failed to mint token");
        SeededUser {
            id: user_id.to_hex(),
            user_id,
            email: email.to_string(),
            access_token,
        }
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub async fn create_organization(&self, owner: &SeededUser, name: &str, slug: &str) -> Value {
        let resp = self
            .auth_post("/api/org", &owner.access_token)
            .json(&serde_json::json!({ "name": name, "slug": slug }))
            .send()
            .await
            .expect("Create organization request failed");

        assert_eq!(
            resp.status().as_u16(),
            201,
            "Create organization failed: {}",
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.expect("Failed to parse organization")
    }

    pub async fn add_member(
        &self,
        organization_id: &str,
        caller: &SeededUser,
        user: &SeededUser,
        role: &str,
    ) {
        let resp = self
            .auth_post(
                &format!("/api/org/{}/member", organization_id),
                &caller.access_token,
            )
            .json(&serde_json::json!({ "user_id": user.id, "role": role }))
            .send()
            .await
            .expect("Add member request failed");

        assert_eq!(
            resp.status().as_u16(),
            201,
            "Add member failed: {}",
            resp.text().await.unwrap_or_default()
        );
    }

    /// Creates an organization owned by a new user and adds an admin, a
    /// member and a viewer.
    pub async fn seed_organization(&self, slug: &str) -> SeededOrganization {
        let owner = self.create_user(&format!("owner@{slug}.com"));
        let admin = self.create_user(&format!("admin@{slug}.com"));
        let member = self.create_user(&format!("member@{slug}.com"));
        let viewer = self.create_user(&format!("viewer@{slug}.com"));

        let org = self
            .create_organization(&owner, &format!("{slug} CRM"), slug)
            .await;
        let id = org["id"].as_str().unwrap().to_string();

        self.add_member(&id, &owner, &admin, "admin").await;
        self.add_member(&id, &owner, &member, "member").await;
        self.add_member(&id, &owner, &viewer, "viewer").await;

        SeededOrganization {
            id,
            slug: slug.to_string(),
            owner,
            admin,
            member,
            viewer,
        }
    }

    /// Reports a CRM event through the API and returns the status code.
    pub async fn post_event(
        &self,
        organization_id: &str,
        caller: &SeededUser,
        event: Value,
    ) -> u16 {
        self.auth_post(
            &format!("/api/org/{}/event", organization_id),
            &caller.access_token,
        )
        .json(&event)
        .send()
        .await
        .expect("Event request failed")
        .status()
        .as_u16()
    }
}
