use async_trait::async_trait;
use bson::{DateTime, Document, doc, oid::ObjectId};
use kanflow_db::models::{Invitation, Organization, OrganizationChanges, OrganizationMember};
use mongodb::Database;
use tracing::info;

use super::base::{BaseDao, DaoResult};
use crate::store::OrganizationStore;

pub struct OrganizationDao {
    pub base: BaseDao<Organization>,
    pub members: BaseDao<OrganizationMember>,
    pub invitations: BaseDao<Invitation>,
}

impl OrganizationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Organization::COLLECTION),
            members: BaseDao::new(db, OrganizationMember::COLLECTION),
            invitations: BaseDao::new(db, Invitation::COLLECTION),
        }
    }
}

fn changes_to_set(changes: &OrganizationChanges) -> Document {
    let mut set = doc! { "updated_at": DateTime::now() };
    if let Some(name) = &changes.name {
        set.insert("name", name.as_str());
    }
    if let Some(description) = &changes.description {
        set.insert("description", description.as_str());
    }
    if let Some(website) = &changes.website {
        set.insert("website", website.as_str());
    }
    if let Some(phone) = &changes.phone {
        set.insert("phone", phone.as_str());
    }
    if let Some(email) = &changes.email {
        set.insert("email", email.as_str());
    }
    if let Some(plan) = changes.plan {
        set.insert("plan", plan.as_str());
    }
    set
}

#[async_trait]
impl OrganizationStore for OrganizationDao {
    async fn insert_organization(&self, organization: &Organization) -> DaoResult<ObjectId> {
        self.base.insert_one(organization).await
    }

    async fn find_organization(&self, id: ObjectId) -> DaoResult<Option<Organization>> {
        self.base.find_by_id(id).await
    }

    async fn find_organization_by_slug(&self, slug: &str) -> DaoResult<Option<Organization>> {
        self.base.find_one(doc! { "slug": slug }).await
    }

    async fn update_organization(
        &self,
        id: ObjectId,
        changes: &OrganizationChanges,
    ) -> DaoResult<Option<Organization>> {
        self.base
            .set_and_fetch(doc! { "_id": id }, changes_to_set(changes))
            .await
    }

    async fn delete_organization(&self, id: ObjectId) -> DaoResult<bool> {
        let deleted = self.base.hard_delete(doc! { "_id": id }).await?;
        if deleted == 0 {
            return Ok(false);
        }
        let members = self
            .members
            .hard_delete(doc! { "organization_id": id })
            .await?;
        let invitations = self
            .invitations
            .hard_delete(doc! { "organization_id": id })
            .await?;
        info!(organization_id = %id, members, invitations, "Organization deleted");
        Ok(true)
    }

    async fn find_user_organizations(&self, user_id: ObjectId) -> DaoResult<Vec<Organization>> {
        let memberships = self
            .members
            .find_many(doc! { "user_id": user_id }, None, None)
            .await?;

        let organization_ids: Vec<ObjectId> =
            memberships.iter().map(|m| m.organization_id).collect();

        if organization_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.base
            .find_many(
                doc! { "_id": { "$in": organization_ids } },
                Some(doc! { "name": 1 }),
                None,
            )
            .await
    }

    async fn find_membership(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<OrganizationMember>> {
        self.members
            .find_one(doc! { "organization_id": organization_id, "user_id": user_id })
            .await
    }

    async fn insert_membership(&self, member: &OrganizationMember) -> DaoResult<ObjectId> {
        self.members.insert_one(member).await
    }

    async fn remove_membership(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        let deleted = self
            .members
            .hard_delete(doc! { "organization_id": organization_id, "user_id": user_id })
            .await?;
        Ok(deleted > 0)
    }

    async fn list_memberships(
        &self,
        organization_id: ObjectId,
    ) -> DaoResult<Vec<OrganizationMember>> {
        self.members
            .find_many(
                doc! { "organization_id": organization_id },
                Some(doc! { "joined_at": 1 }),
                None,
            )
            .await
    }

    async fn insert_invitation(&self, invitation: &Invitation) -> DaoResult<ObjectId> {
        self.invitations.insert_one(invitation).await
    }

    async fn list_invitations(&self, organization_id: ObjectId) -> DaoResult<Vec<Invitation>> {
        self.invitations
            .find_many(
                doc! { "organization_id": organization_id },
                Some(doc! { "created_at": -1 }),
                None,
            )
            .await
    }

    async fn find_pending_invitation(&self, token: &str) -> DaoResult<Option<Invitation>> {
        self.invitations
            .find_one(doc! { "token": token, "status": "pending" })
            .await
    }

    async fn claim_invitation(
        &self,
        token: &str,
        user_id: ObjectId,
        at: DateTime,
    ) -> DaoResult<Option<Invitation>> {
        self.invitations
            .set_and_fetch(
                doc! { "token": token, "status": "pending" },
                doc! { "status": "accepted", "accepted_by": user_id, "accepted_at": at },
            )
            .await
    }
}
