use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Per-user delivery preferences. Absent fields in stored documents fall back
/// to the enabled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default = "bool_true")]
    pub enable_sound: bool,
    #[serde(default = "bool_true")]
    pub whatsapp_message: bool,
    #[serde(default = "bool_true")]
    pub kanban_move: bool,
    #[serde(default = "bool_true")]
    pub contact_update: bool,
    /// Local wall-clock `HH:MM`.
    pub mute_from: Option<String>,
    pub mute_to: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl NotificationPreference {
    pub const COLLECTION: &'static str = "notification_preferences";

    pub fn defaults_for(user_id: ObjectId) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            user_id,
            enable_sound: true,
            whatsapp_message: true,
            kanban_move: true,
            contact_update: true,
            mute_from: None,
            mute_to: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn bool_true() -> bool {
    true
}
