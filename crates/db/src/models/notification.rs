use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub entity: Option<EntityRef>,
    #[serde(default)]
    pub channel: DeliveryChannel,
    /// Null until the recipient marks it read; never cleared afterwards.
    pub read_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    WhatsappMessage,
    KanbanMove,
    ContactCreated,
    ContactUpdated,
    DealCreated,
    DealUpdated,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhatsappMessage => "WHATSAPP_MESSAGE",
            Self::KanbanMove => "KANBAN_MOVE",
            Self::ContactCreated => "CONTACT_CREATED",
            Self::ContactUpdated => "CONTACT_UPDATED",
            Self::DealCreated => "DEAL_CREATED",
            Self::DealUpdated => "DEAL_UPDATED",
        }
    }
}

/// CRM object a notification points at. Ids come from the CRM side and are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: String,
    pub entity_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    #[default]
    Realtime,
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
