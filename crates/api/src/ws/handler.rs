use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::storage::WsSender;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    // Verify the JWT before accepting the upgrade.
    let user_id = match state
        .auth
        .verify_access_token(&params.token)
        .and_then(|claims| claims.user_id())
    {
        Ok(id) => id,
        Err(e) => return ApiError::from(e).into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: ObjectId) {
    let connection_id = Uuid::new_v4().to_string();
    info!(%user_id, %connection_id, "WebSocket connected");

    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(Mutex::new(sender));

    state.ws_storage.add(user_id, sender.clone());

    let connected = serde_json::json!({
        "type": "connected",
        "user_id": user_id.to_hex(),
    });
    send_frame(&sender, &connected).await;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_message(&sender, &user_id, &connection_id, text.as_str()).await;
            }
            Ok(Message::Ping(data)) => {
                let mut guard = sender.lock().await;
                let _ = guard.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(%user_id, %connection_id, %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.ws_storage.remove(&user_id, &sender);
    info!(%user_id, %connection_id, "WebSocket disconnected");
}

/// Clients only talk to keep the connection alive; everything else is ignored.
async fn handle_client_message(
    sender: &WsSender,
    user_id: &ObjectId,
    connection_id: &str,
    text: &str,
) {
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };
    let msg_type = parsed.get("type").and_then(|t| t.as_str()).unwrap_or("");

    debug!(%user_id, %connection_id, msg_type, "WS message received");

    match msg_type {
        "ping" => send_frame(sender, &serde_json::json!({ "type": "pong" })).await,
        _ => debug!(%user_id, msg_type, "Unknown WS message type"),
    }
}

async fn send_frame(sender: &WsSender, frame: &serde_json::Value) {
    let mut guard = sender.lock().await;
    if let Err(e) = guard.send(Message::text(frame.to_string())).await {
        warn!(%e, "Failed to send WS frame");
    }
}
