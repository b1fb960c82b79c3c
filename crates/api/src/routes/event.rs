use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kanflow_services::notification::NotificationEvent;
use serde::Deserialize;

use crate::{
    error::{ApiError, parse_id},
    extractors::auth::AuthUser,
    state::AppState,
};

/// CRM activity reported by the pipeline, contacts and inbox screens.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrmEvent {
    WhatsappMessage {
        recipient_id: String,
        contact_name: String,
        preview: String,
        contact_id: String,
        message_id: String,
    },
    KanbanMove {
        recipient_id: String,
        deal_name: String,
        from_stage: String,
        to_stage: String,
        deal_id: String,
    },
    ContactCreated {
        recipient_id: String,
        contact_name: String,
        contact_id: String,
    },
    ContactUpdated {
        recipient_id: String,
        contact_name: String,
        contact_id: String,
    },
    DealCreated {
        recipient_id: String,
        deal_name: String,
        deal_id: String,
    },
    DealUpdated {
        recipient_id: String,
        deal_name: String,
        deal_id: String,
    },
}

impl CrmEvent {
    fn recipient_id(&self) -> &str {
        match self {
            CrmEvent::WhatsappMessage { recipient_id, .. }
            | CrmEvent::KanbanMove { recipient_id, .. }
            | CrmEvent::ContactCreated { recipient_id, .. }
            | CrmEvent::ContactUpdated { recipient_id, .. }
            | CrmEvent::DealCreated { recipient_id, .. }
            | CrmEvent::DealUpdated { recipient_id, .. } => recipient_id,
        }
    }
}

/// Accepts the event and notifies the recipient. Delivery problems never
/// change the response.
pub async fn emit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
    Json(body): Json<CrmEvent>,
) -> Result<StatusCode, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let recipient = parse_id(body.recipient_id(), "recipient_id")?;

    // Caller must belong to the organization (404 / 403 otherwise).
    state.organizations.get(auth.user_id, oid).await?;
    if !state.organizations.is_member(oid, recipient).await? {
        return Err(ApiError::Forbidden(
            "Recipient is not a member of this organization".to_string(),
        ));
    }

    let dispatcher = &state.dispatcher;
    match body {
        CrmEvent::WhatsappMessage {
            contact_name,
            preview,
            contact_id,
            message_id,
            ..
        } => {
            dispatcher
                .emit_whatsapp_message(recipient, &contact_name, &preview, &contact_id, &message_id)
                .await
        }
        CrmEvent::KanbanMove {
            deal_name,
            from_stage,
            to_stage,
            deal_id,
            ..
        } => {
            dispatcher
                .emit_kanban_move(recipient, &deal_name, &from_stage, &to_stage, &deal_id)
                .await
        }
        CrmEvent::ContactCreated {
            contact_name,
            contact_id,
            ..
        } => {
            dispatcher
                .emit_contact_created(recipient, &contact_name, &contact_id)
                .await
        }
        CrmEvent::ContactUpdated {
            contact_name,
            contact_id,
            ..
        } => {
            dispatcher
                .emit_contact_updated(recipient, &contact_name, &contact_id)
                .await
        }
        CrmEvent::DealCreated {
            deal_name, deal_id, ..
        } => {
            dispatcher
                .emit(NotificationEvent::deal_created(recipient, &deal_name, &deal_id))
                .await
        }
        CrmEvent::DealUpdated {
            deal_name, deal_id, ..
        } => {
            dispatcher
                .emit(NotificationEvent::deal_updated(recipient, &deal_name, &deal_id))
                .await
        }
    }

    Ok(StatusCode::ACCEPTED)
}
