use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::SinkExt;
use serde::Serialize;
use tracing::{debug, warn};

use super::storage::WsStorage;

/// Sends an already encoded frame to every connection of `user_id`.
/// Returns how many connections accepted it.
pub async fn send_text_to_user(ws_storage: &WsStorage, user_id: &ObjectId, text: &str) -> usize {
    let mut delivered = 0;
    for sender in ws_storage.get_senders(user_id) {
        let mut guard = sender.lock().await;
        match guard.send(Message::text(text.to_owned())).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(%user_id, %e, "Failed to send WS message"),
        }
    }
    debug!(%user_id, delivered, "WS message fanned out");
    delivered
}

/// Serializes `message` and fans it out to the user's connections.
pub async fn send_to_user<T: Serialize>(
    ws_storage: &WsStorage,
    user_id: &ObjectId,
    message: &T,
) -> Result<usize, serde_json::Error> {
    let text = serde_json::to_string(message)?;
    Ok(send_text_to_user(ws_storage, user_id, &text).await)
}
