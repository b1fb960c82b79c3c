use std::sync::Arc;

use bson::{DateTime, oid::ObjectId};
use kanflow_config::NotificationSettings;
use kanflow_db::models::{Notification, NotificationPreference};

use super::preferences::{PreferencesUpdate, resolve_preferences};
use crate::dao::base::{DaoError, DaoResult};
use crate::store::NotificationStore;

/// Read side of the notification feature plus preference management.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    settings: NotificationSettings,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, settings: NotificationSettings) -> Self {
        Self { store, settings }
    }

    /// Newest first, capped at the configured maximum.
    pub async fn list(
        &self,
        user_id: ObjectId,
        limit: Option<u32>,
    ) -> DaoResult<Vec<Notification>> {
        let limit = self.settings.clamp_limit(limit);
        self.store.list_notifications(user_id, limit).await
    }

    pub async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.store.count_unread(user_id).await
    }

    /// Marks one of the user's notifications read. Already-read rows are left
    /// untouched and report zero updates.
    pub async fn mark_read(&self, user_id: ObjectId, id: ObjectId) -> DaoResult<u64> {
        if self.store.find_notification(user_id, id).await?.is_none() {
            return Err(DaoError::NotFound);
        }
        self.store.mark_read(user_id, &[id], DateTime::now()).await
    }

    /// Ids that are unknown or belong to someone else are skipped.
    pub async fn mark_many_read(&self, user_id: ObjectId, ids: &[ObjectId]) -> DaoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.store.mark_read(user_id, ids, DateTime::now()).await
    }

    pub async fn get_preferences(&self, user_id: ObjectId) -> DaoResult<NotificationPreference> {
        let stored = self.store.find_preferences(user_id).await?;
        Ok(resolve_preferences(user_id, stored))
    }

    pub async fn update_preferences(
        &self,
        user_id: ObjectId,
        update: &PreferencesUpdate,
    ) -> DaoResult<NotificationPreference> {
        update.validate()?;
        self.store
            .update_preferences(user_id, update, DateTime::now())
            .await
    }
}
