use async_trait::async_trait;
use bson::oid::ObjectId;
use kanflow_db::models::{DeliveryChannel, Notification, NotificationType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to encode realtime event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Realtime transport unavailable: {0}")]
    Unavailable(String),
}

/// What a connected client receives for a new notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub channel: DeliveryChannel,
    pub created_at: String,
    pub enable_sound: bool,
    pub is_muted: bool,
}

impl NotificationPayload {
    pub fn new(
        id: ObjectId,
        notification: &Notification,
        enable_sound: bool,
        is_muted: bool,
    ) -> Self {
        Self {
            id: id.to_hex(),
            notification_type: notification.notification_type,
            title: notification.title.clone(),
            body: notification.body.clone(),
            entity_type: notification.entity.as_ref().map(|e| e.entity_type.clone()),
            entity_id: notification.entity.as_ref().map(|e| e.entity_id.clone()),
            channel: notification.channel,
            created_at: notification
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
            enable_sound,
            is_muted,
        }
    }
}

/// Frames pushed over a user's live connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RealtimeEvent {
    #[serde(rename = "notification:new")]
    NotificationNew(NotificationPayload),
}

/// Best-effort, at-most-once delivery to whatever sessions the user has open.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Returns how many live sessions the event reached. Zero is not an error.
    async fn publish(&self, user_id: ObjectId, event: &RealtimeEvent)
    -> Result<usize, PublishError>;
}
