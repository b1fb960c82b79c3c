use async_trait::async_trait;
use bson::{Bson, DateTime, Document, doc, oid::ObjectId};
use kanflow_db::models::{Notification, NotificationPreference};
use mongodb::Database;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::notification::PreferencesUpdate;
use crate::store::NotificationStore;

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
    pub preferences: BaseDao<NotificationPreference>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
            preferences: BaseDao::new(db, NotificationPreference::COLLECTION),
        }
    }
}

/// Splits a partial update into the `$set` of the fields that were sent and
/// the `$setOnInsert` defaults for the rest, so concurrent updates to
/// different fields never overwrite each other.
fn preference_update_docs(update: &PreferencesUpdate, at: DateTime) -> (Document, Document) {
    let mut set = doc! { "updated_at": at };
    let mut on_insert = doc! { "created_at": at };

    for (field, value) in [
        ("enable_sound", update.enable_sound),
        ("whatsapp_message", update.whatsapp_message),
        ("kanban_move", update.kanban_move),
        ("contact_update", update.contact_update),
    ] {
        match value {
            Some(v) => set.insert(field, v),
            None => on_insert.insert(field, true),
        };
    }
    for (field, value) in [("mute_from", &update.mute_from), ("mute_to", &update.mute_to)] {
        match value {
            Some(v) => set.insert(field, v.clone()),
            None => on_insert.insert(field, Bson::Null),
        };
    }
    (set, on_insert)
}

#[async_trait]
impl NotificationStore for NotificationDao {
    async fn insert_notification(&self, notification: &Notification) -> DaoResult<ObjectId> {
        self.base.insert_one(notification).await
    }

    async fn list_notifications(
        &self,
        user_id: ObjectId,
        limit: u32,
    ) -> DaoResult<Vec<Notification>> {
        self.base
            .find_many(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": -1, "_id": -1 }),
                Some(i64::from(limit)),
            )
            .await
    }

    async fn find_notification(
        &self,
        user_id: ObjectId,
        id: ObjectId,
    ) -> DaoResult<Option<Notification>> {
        self.base
            .find_one(doc! { "_id": id, "user_id": user_id })
            .await
    }

    async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "user_id": user_id, "read_at": null })
            .await
    }

    async fn mark_read(
        &self,
        user_id: ObjectId,
        ids: &[ObjectId],
        at: DateTime,
    ) -> DaoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        // The read_at filter keeps an existing timestamp untouched.
        self.base
            .update_many(
                doc! { "_id": { "$in": ids.to_vec() }, "user_id": user_id, "read_at": null },
                doc! { "read_at": at },
            )
            .await
    }

    async fn find_preferences(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<Option<NotificationPreference>> {
        self.preferences
            .find_one(doc! { "user_id": user_id })
            .await
    }

    async fn update_preferences(
        &self,
        user_id: ObjectId,
        update: &PreferencesUpdate,
        at: DateTime,
    ) -> DaoResult<NotificationPreference> {
        let (set, on_insert) = preference_update_docs(update, at);
        self.preferences
            .upsert_and_fetch(
                doc! { "user_id": user_id },
                doc! { "$set": set, "$setOnInsert": on_insert },
            )
            .await?
            .ok_or(DaoError::NotFound)
    }
}
