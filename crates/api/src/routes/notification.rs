use axum::{
    Json,
    extract::{Path, Query, State},
};
use kanflow_db::models::{DeliveryChannel, Notification, NotificationPreference, NotificationType};
use kanflow_services::notification::PreferencesUpdate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MarkManyRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub channel: DeliveryChannel,
    pub read_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub enable_sound: bool,
    pub whatsapp_message: bool,
    pub kanban_move: bool,
    pub contact_update: bool,
    pub mute_from: Option<String>,
    pub mute_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}

fn to_response(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
        notification_type: n.notification_type,
        title: n.title,
        body: n.body,
        entity_type: n.entity.as_ref().map(|e| e.entity_type.clone()),
        entity_id: n.entity.map(|e| e.entity_id),
        channel: n.channel,
        read_at: n.read_at.and_then(|t| t.try_to_rfc3339_string().ok()),
        created_at: n.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

fn to_preferences_response(p: NotificationPreference) -> PreferencesResponse {
    PreferencesResponse {
        enable_sound: p.enable_sound,
        whatsapp_message: p.whatsapp_message,
        kanban_move: p.kanban_move,
        contact_update: p.contact_update,
        mute_from: p.mute_from,
        mute_to: p.mute_to,
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let items = state.notifications.list(auth.user_id, params.limit).await?;
    Ok(Json(items.into_iter().map(to_response).collect()))
}

pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state.notifications.count_unread(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let id = parse_id(&notification_id, "notification_id")?;
    let updated = state.notifications.mark_read(auth.user_id, id).await?;
    Ok(Json(UpdatedResponse { updated }))
}

pub async fn mark_many_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<MarkManyRequest>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let ids = body
        .ids
        .iter()
        .map(|id| parse_id(id, "notification id"))
        .collect::<Result<Vec<_>, _>>()?;
    let updated = state.notifications.mark_many_read(auth.user_id, &ids).await?;
    Ok(Json(UpdatedResponse { updated }))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let prefs = state.notifications.get_preferences(auth.user_id).await?;
    Ok(Json(to_preferences_response(prefs)))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PreferencesUpdate>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let prefs = state
        .notifications
        .update_preferences(auth.user_id, &body)
        .await?;
    Ok(Json(to_preferences_response(prefs)))
}
