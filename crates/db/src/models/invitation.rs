use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use super::organization_member::MemberRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub organization_id: ObjectId,
    pub email: String,
    pub role: MemberRole,
    pub token: String,
    pub inviter_id: ObjectId,
    #[serde(default)]
    pub status: InvitationStatus,
    pub accepted_by: Option<ObjectId>,
    pub accepted_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
}

impl Invitation {
    pub const COLLECTION: &'static str = "invitations";
}
