use std::sync::Arc;

use bson::{DateTime, oid::ObjectId};
use chrono::{Local, NaiveTime};
use kanflow_db::models::{DeliveryChannel, EntityRef, Notification, NotificationType};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::preferences::{is_muted, is_type_enabled, resolve_preferences};
use super::publisher::{NotificationPayload, NotificationPublisher, PublishError, RealtimeEvent};
use crate::dao::base::DaoError;
use crate::store::NotificationStore;

/// A domain event addressed to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub user_id: ObjectId,
    pub kind: NotificationType,
    pub title: String,
    pub body: String,
    pub entity: Option<EntityRef>,
}

impl NotificationEvent {
    fn with_entity(
        user_id: ObjectId,
        kind: NotificationType,
        title: String,
        body: String,
        entity_type: &str,
        entity_id: &str,
    ) -> Self {
        Self {
            user_id,
            kind,
            title,
            body,
            entity: Some(EntityRef {
                entity_type: entity_type.to_string(),
                entity_id: entity_id.to_string(),
            }),
        }
    }

    pub fn whatsapp_message(
        user_id: ObjectId,
        contact_name: &str,
        preview: &str,
        message_id: &str,
    ) -> Self {
        Self::with_entity(
            user_id,
            NotificationType::WhatsappMessage,
            format!("Nova mensagem de {contact_name}"),
            preview.to_string(),
            "message",
            message_id,
        )
    }

    pub fn kanban_move(
        user_id: ObjectId,
        deal_name: &str,
        from_stage: &str,
        to_stage: &str,
        deal_id: &str,
    ) -> Self {
        Self::with_entity(
            user_id,
            NotificationType::KanbanMove,
            format!("Card movido: {deal_name}"),
            format!("{from_stage} → {to_stage}"),
            "card",
            deal_id,
        )
    }

    pub fn contact_created(user_id: ObjectId, contact_name: &str, contact_id: &str) -> Self {
        Self::with_entity(
            user_id,
            NotificationType::ContactCreated,
            format!("Novo contato: {contact_name}"),
            "Um novo contato foi adicionado".to_string(),
            "contact",
            contact_id,
        )
    }

    pub fn contact_updated(user_id: ObjectId, contact_name: &str, contact_id: &str) -> Self {
        Self::with_entity(
            user_id,
            NotificationType::ContactUpdated,
            format!("Contato atualizado: {contact_name}"),
            "As informações do contato foram atualizadas".to_string(),
            "contact",
            contact_id,
        )
    }

    pub fn deal_created(user_id: ObjectId, deal_name: &str, deal_id: &str) -> Self {
        Self::with_entity(
            user_id,
            NotificationType::DealCreated,
            format!("Novo negócio: {deal_name}"),
            "Um novo negócio foi criado".to_string(),
            "deal",
            deal_id,
        )
    }

    pub fn deal_updated(user_id: ObjectId, deal_name: &str, deal_id: &str) -> Self {
        Self::with_entity(
            user_id,
            NotificationType::DealUpdated,
            format!("Negócio atualizado: {deal_name}"),
            "As informações do negócio foram atualizadas".to_string(),
            "deal",
            deal_id,
        )
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid notification: {0}")]
    Invalid(&'static str),
    #[error("Notification store failed: {0}")]
    Store(#[from] DaoError),
    #[error("Notification {notification_id} stored but not published: {source}")]
    Publish {
        notification_id: ObjectId,
        #[source]
        source: PublishError,
    },
}

/// How a single event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The recipient turned this kind off.
    Suppressed,
    Delivered {
        notification_id: ObjectId,
        is_muted: bool,
        sessions: usize,
    },
}

/// Persists notifications and pushes them to the recipient's live sessions.
///
/// Emission never fails from the caller's point of view: errors are logged at
/// this boundary and dropped, so the domain action that triggered the event
/// still succeeds. The stored row is the recovery path for anything that was
/// not pushed.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self { store, publisher }
    }

    /// Emits using the server's local wall-clock time for quiet hours.
    pub async fn emit(&self, event: NotificationEvent) {
        self.emit_at(event, Local::now().time()).await;
    }

    pub async fn emit_at(&self, event: NotificationEvent, now: NaiveTime) {
        let user_id = event.user_id;
        let kind = event.kind.as_str();

        match self.dispatch(event, now).await {
            Ok(Dispatch::Suppressed) => {
                debug!(%user_id, kind, "Notification type disabled, dropped");
            }
            Ok(Dispatch::Delivered {
                notification_id,
                is_muted,
                sessions,
            }) => {
                info!(%user_id, kind, %notification_id, is_muted, sessions, "Notification emitted");
            }
            Err(NotificationError::Publish {
                notification_id,
                source,
            }) => {
                warn!(
                    %user_id,
                    kind,
                    %notification_id,
                    %source,
                    "Notification stored but not pushed"
                );
            }
            Err(e) => {
                error!(%user_id, kind, error = %e, "Failed to emit notification");
            }
        }
    }

    pub async fn emit_whatsapp_message(
        &self,
        user_id: ObjectId,
        contact_name: &str,
        preview: &str,
        contact_id: &str,
        message_id: &str,
    ) {
        debug!(%user_id, contact_id, message_id, "WhatsApp message notification");
        self.emit(NotificationEvent::whatsapp_message(
            user_id,
            contact_name,
            preview,
            message_id,
        ))
        .await;
    }

    pub async fn emit_kanban_move(
        &self,
        user_id: ObjectId,
        deal_name: &str,
        from_stage: &str,
        to_stage: &str,
        deal_id: &str,
    ) {
        self.emit(NotificationEvent::kanban_move(
            user_id, deal_name, from_stage, to_stage, deal_id,
        ))
        .await;
    }

    pub async fn emit_contact_created(
        &self,
        user_id: ObjectId,
        contact_name: &str,
        contact_id: &str,
    ) {
        self.emit(NotificationEvent::contact_created(user_id, contact_name, contact_id))
            .await;
    }

    pub async fn emit_contact_updated(
        &self,
        user_id: ObjectId,
        contact_name: &str,
        contact_id: &str,
    ) {
        self.emit(NotificationEvent::contact_updated(user_id, contact_name, contact_id))
            .await;
    }

    /// Persist first, then publish: a crash in between leaves a stored but
    /// unpushed notification, never the reverse.
    pub async fn dispatch(
        &self,
        event: NotificationEvent,
        now: NaiveTime,
    ) -> Result<Dispatch, NotificationError> {
        if event.title.trim().is_empty() {
            return Err(NotificationError::Invalid("title is empty"));
        }
        if event.body.trim().is_empty() {
            return Err(NotificationError::Invalid("body is empty"));
        }

        let stored = self.store.find_preferences(event.user_id).await?;
        let preferences = resolve_preferences(event.user_id, stored);

        if !is_type_enabled(&preferences, event.kind) {
            return Ok(Dispatch::Suppressed);
        }

        let is_muted = is_muted(&preferences, now);
        if is_muted {
            debug!(user_id = %event.user_id, "Recipient is in quiet hours");
        }

        let notification = Notification {
            id: None,
            user_id: event.user_id,
            notification_type: event.kind,
            title: event.title,
            body: event.body,
            entity: event.entity,
            channel: DeliveryChannel::Realtime,
            read_at: None,
            created_at: DateTime::now(),
        };
        let notification_id = self.store.insert_notification(&notification).await?;

        let frame = RealtimeEvent::NotificationNew(NotificationPayload::new(
            notification_id,
            &notification,
            preferences.enable_sound,
            is_muted,
        ));
        let sessions = self
            .publisher
            .publish(notification.user_id, &frame)
            .await
            .map_err(|source| NotificationError::Publish {
                notification_id,
                source,
            })?;

        Ok(Dispatch::Delivered {
            notification_id,
            is_muted,
            sessions,
        })
    }
}
