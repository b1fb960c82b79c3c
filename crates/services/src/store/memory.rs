use std::collections::HashMap;

use async_trait::async_trait;
use bson::{DateTime, oid::ObjectId};
use kanflow_db::models::{
    Invitation, InvitationStatus, Notification, NotificationPreference, Organization,
    OrganizationChanges, OrganizationMember,
};
use parking_lot::RwLock;

use super::{NotificationStore, OrganizationStore};
use crate::dao::base::{DaoError, DaoResult};
use crate::notification::PreferencesUpdate;

/// Process-local store with the same uniqueness rules as the Mongo indexes.
#[derive(Default)]
pub struct MemoryStore {
    notifications: RwLock<Vec<Notification>>,
    preferences: RwLock<HashMap<ObjectId, NotificationPreference>>,
    organizations: RwLock<Vec<Organization>>,
    members: RwLock<Vec<OrganizationMember>>,
    invitations: RwLock<Vec<Invitation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> DaoResult<ObjectId> {
        let id = ObjectId::new();
        let mut row = notification.clone();
        row.id = Some(id);
        self.notifications.write().push(row);
        Ok(id)
    }

    async fn list_notifications(
        &self,
        user_id: ObjectId,
        limit: u32,
    ) -> DaoResult<Vec<Notification>> {
        let mut rows: Vec<Notification> = self
            .notifications
            .read()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn find_notification(
        &self,
        user_id: ObjectId,
        id: ObjectId,
    ) -> DaoResult<Option<Notification>> {
        Ok(self
            .notifications
            .read()
            .iter()
            .find(|n| n.id == Some(id) && n.user_id == user_id)
            .cloned())
    }

    async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        Ok(self
            .notifications
            .read()
            .iter()
            .filter(|n| n.user_id == user_id && n.read_at.is_none())
            .count() as u64)
    }

    async fn mark_read(
        &self,
        user_id: ObjectId,
        ids: &[ObjectId],
        at: DateTime,
    ) -> DaoResult<u64> {
        let mut changed = 0;
        for row in self.notifications.write().iter_mut() {
            let selected = row.id.is_some_and(|id| ids.contains(&id));
            if selected && row.user_id == user_id && row.read_at.is_none() {
                row.read_at = Some(at);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn find_preferences(
        &self,
        user_id: ObjectId,
    ) -> DaoResult<Option<NotificationPreference>> {
        Ok(self.preferences.read().get(&user_id).cloned())
    }

    async fn update_preferences(
        &self,
        user_id: ObjectId,
        update: &PreferencesUpdate,
        at: DateTime,
    ) -> DaoResult<NotificationPreference> {
        let mut map = self.preferences.write();
        let current = map.remove(&user_id).unwrap_or_else(|| {
            let mut row = NotificationPreference::defaults_for(user_id);
            row.id = Some(ObjectId::new());
            row.created_at = at;
            row
        });
        let row = update.apply(current, at);
        map.insert(user_id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn insert_organization(&self, organization: &Organization) -> DaoResult<ObjectId> {
        let mut rows = self.organizations.write();
        if rows.iter().any(|o| o.slug == organization.slug) {
            return Err(DaoError::DuplicateKey(format!(
                "slug '{}' already exists",
                organization.slug
            )));
        }
        let id = ObjectId::new();
        let mut row = organization.clone();
        row.id = Some(id);
        rows.push(row);
        Ok(id)
    }

    async fn find_organization(&self, id: ObjectId) -> DaoResult<Option<Organization>> {
        Ok(self
            .organizations
            .read()
            .iter()
            .find(|o| o.id == Some(id))
            .cloned())
    }

    async fn find_organization_by_slug(&self, slug: &str) -> DaoResult<Option<Organization>> {
        Ok(self
            .organizations
            .read()
            .iter()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn update_organization(
        &self,
        id: ObjectId,
        changes: &OrganizationChanges,
    ) -> DaoResult<Option<Organization>> {
        let mut rows = self.organizations.write();
        let Some(row) = rows.iter_mut().find(|o| o.id == Some(id)) else {
            return Ok(None);
        };
        changes.apply(row);
        row.updated_at = DateTime::now();
        Ok(Some(row.clone()))
    }

    async fn delete_organization(&self, id: ObjectId) -> DaoResult<bool> {
        let mut rows = self.organizations.write();
        let before = rows.len();
        rows.retain(|o| o.id != Some(id));
        if rows.len() == before {
            return Ok(false);
        }
        self.members.write().retain(|m| m.organization_id != id);
        self.invitations.write().retain(|i| i.organization_id != id);
        Ok(true)
    }

    async fn find_user_organizations(&self, user_id: ObjectId) -> DaoResult<Vec<Organization>> {
        let organization_ids: Vec<ObjectId> = self
            .members
            .read()
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.organization_id)
            .collect();

        let mut rows: Vec<Organization> = self
            .organizations
            .read()
            .iter()
            .filter(|o| o.id.is_some_and(|id| organization_ids.contains(&id)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_membership(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<OrganizationMember>> {
        Ok(self
            .members
            .read()
            .iter()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(&self, member: &OrganizationMember) -> DaoResult<ObjectId> {
        let mut rows = self.members.write();
        if rows
            .iter()
            .any(|m| m.organization_id == member.organization_id && m.user_id == member.user_id)
        {
            return Err(DaoError::DuplicateKey(
                "user is already a member of this organization".to_string(),
            ));
        }
        let id = ObjectId::new();
        let mut row = member.clone();
        row.id = Some(id);
        rows.push(row);
        Ok(id)
    }

    async fn remove_membership(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        let mut rows = self.members.write();
        let before = rows.len();
        rows.retain(|m| !(m.organization_id == organization_id && m.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn list_memberships(
        &self,
        organization_id: ObjectId,
    ) -> DaoResult<Vec<OrganizationMember>> {
        let mut rows: Vec<OrganizationMember> = self
            .members
            .read()
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.joined_at);
        Ok(rows)
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> DaoResult<ObjectId> {
        let mut rows = self.invitations.write();
        if rows.iter().any(|i| i.token == invitation.token) {
            return Err(DaoError::DuplicateKey("invitation token collision".to_string()));
        }
        let id = ObjectId::new();
        let mut row = invitation.clone();
        row.id = Some(id);
        rows.push(row);
        Ok(id)
    }

    async fn list_invitations(&self, organization_id: ObjectId) -> DaoResult<Vec<Invitation>> {
        let mut rows: Vec<Invitation> = self
            .invitations
            .read()
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_pending_invitation(&self, token: &str) -> DaoResult<Option<Invitation>> {
        Ok(self
            .invitations
            .read()
            .iter()
            .find(|i| i.token == token && i.status == InvitationStatus::Pending)
            .cloned())
    }

    async fn claim_invitation(
        &self,
        token: &str,
        user_id: ObjectId,
        at: DateTime,
    ) -> DaoResult<Option<Invitation>> {
        let mut rows = self.invitations.write();
        let Some(row) = rows
            .iter_mut()
            .find(|i| i.token == token && i.status == InvitationStatus::Pending)
        else {
            return Ok(None);
        };
        row.status = InvitationStatus::Accepted;
        row.accepted_by = Some(user_id);
        row.accepted_at = Some(at);
        Ok(Some(row.clone()))
    }
}
