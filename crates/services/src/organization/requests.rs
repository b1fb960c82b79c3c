use bson::oid::ObjectId;
use kanflow_db::models::{MemberRole, OrganizationChanges, Plan};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Lowercase ASCII letters, digits and single inner hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        return Ok(());
    }
    let mut err = ValidationError::new("slug");
    err.message = Some("slug must be lowercase letters, digits and hyphens".into());
    Err(err)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganization {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(length(max = 40))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[serde(default)]
    pub plan: Plan,
}

/// Slug is deliberately absent: it is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(url)]
    pub website: Option<String>,

    #[validate(length(max = 40))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub plan: Option<Plan>,
}

impl From<UpdateOrganization> for OrganizationChanges {
    fn from(u: UpdateOrganization) -> Self {
        Self {
            name: u.name,
            description: u.description,
            website: u.website,
            phone: u.phone,
            email: u.email,
            plan: u.plan,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddMember {
    pub user_id: ObjectId,
    pub role: MemberRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteMember {
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    pub role: MemberRole,
}
