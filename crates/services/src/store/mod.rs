//! Storage seams for the notification and organization services.
//!
//! The Mongo DAOs in [`crate::dao`] are the production implementations;
//! [`MemoryStore`] keeps everything in process.

pub mod memory;

use async_trait::async_trait;
use bson::{DateTime, oid::ObjectId};
use kanflow_db::models::{
    Invitation, Notification, NotificationPreference, Organization, OrganizationChanges,
    OrganizationMember,
};

use crate::dao::base::DaoResult;
use crate::notification::PreferencesUpdate;

pub use memory::MemoryStore;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: &Notification) -> DaoResult<ObjectId>;

    /// Most recent first.
    async fn list_notifications(
        &self,
        user_id: ObjectId,
        limit: u32,
    ) -> DaoResult<Vec<Notification>>;

    async fn find_notification(
        &self,
        user_id: ObjectId,
        id: ObjectId,
    ) -> DaoResult<Option<Notification>>;

    async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64>;

    /// Stamps `read_at` on the user's notifications in `ids` that are still
    /// unread. Returns how many rows changed.
    async fn mark_read(&self, user_id: ObjectId, ids: &[ObjectId], at: DateTime)
    -> DaoResult<u64>;

    async fn find_preferences(&self, user_id: ObjectId)
    -> DaoResult<Option<NotificationPreference>>;

    /// Applies only the fields present in `update`, creating the row from the
    /// defaults when the user has none yet. Returns the row after the write.
    async fn update_preferences(
        &self,
        user_id: ObjectId,
        update: &PreferencesUpdate,
        at: DateTime,
    ) -> DaoResult<NotificationPreference>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Fails with `DuplicateKey` when the slug is taken.
    async fn insert_organization(&self, organization: &Organization) -> DaoResult<ObjectId>;

    async fn find_organization(&self, id: ObjectId) -> DaoResult<Option<Organization>>;

    async fn find_organization_by_slug(&self, slug: &str) -> DaoResult<Option<Organization>>;

    async fn update_organization(
        &self,
        id: ObjectId,
        changes: &OrganizationChanges,
    ) -> DaoResult<Option<Organization>>;

    /// Removes the organization together with its memberships and invitations.
    async fn delete_organization(&self, id: ObjectId) -> DaoResult<bool>;

    async fn find_user_organizations(&self, user_id: ObjectId) -> DaoResult<Vec<Organization>>;

    async fn find_membership(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<OrganizationMember>>;

    /// Fails with `DuplicateKey` when the user already belongs to the organization.
    async fn insert_membership(&self, member: &OrganizationMember) -> DaoResult<ObjectId>;

    async fn remove_membership(&self, organization_id: ObjectId, user_id: ObjectId)
    -> DaoResult<bool>;

    async fn list_memberships(&self, organization_id: ObjectId)
    -> DaoResult<Vec<OrganizationMember>>;

    async fn insert_invitation(&self, invitation: &Invitation) -> DaoResult<ObjectId>;

    async fn list_invitations(&self, organization_id: ObjectId) -> DaoResult<Vec<Invitation>>;

    async fn find_pending_invitation(&self, token: &str) -> DaoResult<Option<Invitation>>;

    /// Atomically moves a pending invitation to accepted. `None` when the token
    /// is unknown or was already consumed.
    async fn claim_invitation(
        &self,
        token: &str,
        user_id: ObjectId,
        at: DateTime,
    ) -> DaoResult<Option<Invitation>>;
}
