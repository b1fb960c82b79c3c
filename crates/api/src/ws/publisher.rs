use async_trait::async_trait;
use bson::oid::ObjectId;
use kanflow_services::notification::{NotificationPublisher, PublishError, RealtimeEvent};
use std::sync::Arc;

use super::{dispatcher, storage::WsStorage};

/// Pushes notification frames to the recipient's open WebSockets.
pub struct WsPublisher {
    ws_storage: Arc<WsStorage>,
}

impl WsPublisher {
    pub fn new(ws_storage: Arc<WsStorage>) -> Self {
        Self { ws_storage }
    }
}

#[async_trait]
impl NotificationPublisher for WsPublisher {
    async fn publish(
        &self,
        user_id: ObjectId,
        event: &RealtimeEvent,
    ) -> Result<usize, PublishError> {
        Ok(dispatcher::send_to_user(&self.ws_storage, &user_id, event).await?)
    }
}
