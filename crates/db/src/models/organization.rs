use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Globally unique, set once at creation.
    pub slug: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: ObjectId,
    #[serde(default)]
    pub plan: Plan,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Starter,
    Professional,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Starter => "starter",
            Plan::Professional => "professional",
            Plan::Enterprise => "enterprise",
        }
    }
}

/// Mutable organization attributes; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct OrganizationChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub plan: Option<Plan>,
}

impl OrganizationChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.website.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.plan.is_none()
    }

    pub fn apply(&self, org: &mut Organization) {
        if let Some(name) = &self.name {
            org.name = name.clone();
        }
        if let Some(description) = &self.description {
            org.description = Some(description.clone());
        }
        if let Some(website) = &self.website {
            org.website = Some(website.clone());
        }
        if let Some(phone) = &self.phone {
            org.phone = Some(phone.clone());
        }
        if let Some(email) = &self.email {
            org.email = Some(email.clone());
        }
        if let Some(plan) = self.plan {
            org.plan = plan;
        }
    }
}

impl Organization {
    pub const COLLECTION: &'static str = "organizations";
}
