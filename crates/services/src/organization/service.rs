use std::sync::Arc;

use bson::{DateTime, oid::ObjectId};
use kanflow_db::models::{
    Invitation, InvitationStatus, MemberRole, Organization, OrganizationChanges,
    OrganizationMember,
};
use nanoid::nanoid;
use tracing::{info, warn};
use validator::Validate;

use super::requests::{AddMember, CreateOrganization, InviteMember, UpdateOrganization};
use crate::dao::base::{DaoError, DaoResult};
use crate::store::OrganizationStore;

/// Organizations, their members and pending invitations.
///
/// Every organization-scoped call resolves the caller's membership first:
/// a missing organization is `NotFound`, a non-member is `Forbidden`, and
/// mutations additionally require an owner or admin role.
pub struct OrganizationService {
    store: Arc<dyn OrganizationStore>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    async fn membership(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<OrganizationMember> {
        if self.store.find_organization(organization_id).await?.is_none() {
            return Err(DaoError::NotFound);
        }
        self.store
            .find_membership(organization_id, user_id)
            .await?
            .ok_or_else(|| DaoError::Forbidden("Not a member of this organization".to_string()))
    }

    async fn manager(
        &self,
        organization_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<OrganizationMember> {
        let member = self.membership(organization_id, user_id).await?;
        if !member.role.can_manage() {
            return Err(DaoError::Forbidden(format!(
                "Role '{}' is read-only",
                member.role.as_str()
            )));
        }
        Ok(member)
    }

    pub async fn is_member(&self, organization_id: ObjectId, user_id: ObjectId) -> DaoResult<bool> {
        Ok(self
            .store
            .find_membership(organization_id, user_id)
            .await?
            .is_some())
    }

    pub async fn list(&self, user_id: ObjectId) -> DaoResult<Vec<Organization>> {
        self.store.find_user_organizations(user_id).await
    }

    pub async fn get(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
    ) -> DaoResult<Organization> {
        let organization = self
            .store
            .find_organization(organization_id)
            .await?
            .ok_or(DaoError::NotFound)?;
        if !self.is_member(organization_id, user_id).await? {
            return Err(DaoError::Forbidden(
                "Not a member of this organization".to_string(),
            ));
        }
        Ok(organization)
    }

    /// The creator becomes the organization's first owner.
    pub async fn create(
        &self,
        user_id: ObjectId,
        request: CreateOrganization,
    ) -> DaoResult<Organization> {
        request.validate()?;

        if self
            .store
            .find_organization_by_slug(&request.slug)
            .await?
            .is_some()
        {
            return Err(slug_taken(&request.slug));
        }

        let now = DateTime::now();
        let mut organization = Organization {
            id: None,
            name: request.name,
            slug: request.slug,
            description: request.description,
            website: request.website,
            phone: request.phone,
            email: request.email,
            owner_id: user_id,
            plan: request.plan,
            created_at: now,
            updated_at: now,
        };

        // The unique index still guards the race between check and insert.
        let organization_id = match self.store.insert_organization(&organization).await {
            Ok(id) => id,
            Err(DaoError::DuplicateKey(_)) => return Err(slug_taken(&organization.slug)),
            Err(e) => return Err(e),
        };
        organization.id = Some(organization_id);

        let owner = OrganizationMember {
            id: None,
            organization_id,
            user_id,
            role: MemberRole::Owner,
            invited_by: None,
            joined_at: now,
        };
        if let Err(e) = self.store.insert_membership(&owner).await {
            warn!(
                %organization_id,
                error = %e,
                "Owner membership failed, rolling back organization"
            );
            self.store.delete_organization(organization_id).await?;
            return Err(e);
        }

        info!(
            %organization_id,
            slug = %organization.slug,
            owner = %user_id,
            "Organization created"
        );
        Ok(organization)
    }

    pub async fn update(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
        request: UpdateOrganization,
    ) -> DaoResult<Organization> {
        self.manager(organization_id, user_id).await?;
        request.validate()?;

        let changes = OrganizationChanges::from(request);
        if changes.is_empty() {
            return self
                .store
                .find_organization(organization_id)
                .await?
                .ok_or(DaoError::NotFound);
        }

        self.store
            .update_organization(organization_id, &changes)
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Owner only. Memberships and invitations go with it.
    pub async fn delete(&self, user_id: ObjectId, organization_id: ObjectId) -> DaoResult<()> {
        let member = self.membership(organization_id, user_id).await?;
        if member.role != MemberRole::Owner {
            return Err(DaoError::Forbidden(
                "Only an owner can delete the organization".to_string(),
            ));
        }
        if !self.store.delete_organization(organization_id).await? {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    pub async fn list_members(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
    ) -> DaoResult<Vec<OrganizationMember>> {
        self.membership(organization_id, user_id).await?;
        self.store.list_memberships(organization_id).await
    }

    pub async fn add_member(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
        request: AddMember,
    ) -> DaoResult<OrganizationMember> {
        let caller = self.manager(organization_id, user_id).await?;
        require_owner_to_grant_owner(caller.role, request.role)?;

        if self
            .store
            .find_membership(organization_id, request.user_id)
            .await?
            .is_some()
        {
            return Err(already_member());
        }

        let mut member = OrganizationMember {
            id: None,
            organization_id,
            user_id: request.user_id,
            role: request.role,
            invited_by: Some(user_id),
            joined_at: DateTime::now(),
        };
        member.id = Some(self.store.insert_membership(&member).await?);
        Ok(member)
    }

    pub async fn remove_member(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
        target_user_id: ObjectId,
    ) -> DaoResult<()> {
        let caller = self.manager(organization_id, user_id).await?;
        let target = self
            .store
            .find_membership(organization_id, target_user_id)
            .await?
            .ok_or(DaoError::NotFound)?;

        if target.role == MemberRole::Owner {
            if caller.role != MemberRole::Owner {
                return Err(DaoError::Forbidden(
                    "Only an owner can remove another owner".to_string(),
                ));
            }
            let owners = self
                .store
                .list_memberships(organization_id)
                .await?
                .iter()
                .filter(|m| m.role == MemberRole::Owner)
                .count();
            if owners <= 1 {
                return Err(DaoError::Validation(
                    "Cannot remove the last owner of an organization".to_string(),
                ));
            }
        }

        if !self
            .store
            .remove_membership(organization_id, target_user_id)
            .await?
        {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    pub async fn invite(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
        request: InviteMember,
    ) -> DaoResult<Invitation> {
        let caller = self.manager(organization_id, user_id).await?;
        request.validate()?;
        require_owner_to_grant_owner(caller.role, request.role)?;

        let mut invitation = Invitation {
            id: None,
            organization_id,
            email: request.email.to_lowercase(),
            role: request.role,
            token: nanoid!(32),
            inviter_id: user_id,
            status: InvitationStatus::Pending,
            accepted_by: None,
            accepted_at: None,
            created_at: DateTime::now(),
        };
        invitation.id = Some(self.store.insert_invitation(&invitation).await?);

        info!(
            %organization_id,
            email = %invitation.email,
            role = invitation.role.as_str(),
            "Invitation created"
        );
        Ok(invitation)
    }

    pub async fn list_invitations(
        &self,
        user_id: ObjectId,
        organization_id: ObjectId,
    ) -> DaoResult<Vec<Invitation>> {
        self.manager(organization_id, user_id).await?;
        self.store.list_invitations(organization_id).await
    }

    /// Joins the caller with the invited role, then consumes the token.
    ///
    /// A caller who already belongs to the organization is refused before
    /// the token is touched, so it stays usable by the intended invitee.
    /// The membership is written before the claim: a failed write leaves the
    /// token pending, and a lost claim race removes the membership again.
    pub async fn accept_invite(
        &self,
        user_id: ObjectId,
        token: &str,
    ) -> DaoResult<OrganizationMember> {
        let pending = self
            .store
            .find_pending_invitation(token)
            .await?
            .ok_or(DaoError::NotFound)?;
        let organization_id = pending.organization_id;

        if self
            .store
            .find_membership(organization_id, user_id)
            .await?
            .is_some()
        {
            return Err(already_member());
        }

        let mut member = OrganizationMember {
            id: None,
            organization_id,
            user_id,
            role: pending.role,
            invited_by: Some(pending.inviter_id),
            joined_at: DateTime::now(),
        };
        member.id = Some(self.store.insert_membership(&member).await?);

        let claimed = self
            .store
            .claim_invitation(token, user_id, DateTime::now())
            .await
            .and_then(|invitation| invitation.ok_or(DaoError::NotFound));
        if let Err(e) = claimed {
            warn!(
                %organization_id,
                %user_id,
                error = %e,
                "Invitation claim failed, removing membership"
            );
            self.store.remove_membership(organization_id, user_id).await?;
            return Err(e);
        }

        info!(%organization_id, %user_id, role = member.role.as_str(), "Invitation accepted");
        Ok(member)
    }
}

fn slug_taken(slug: &str) -> DaoError {
    DaoError::Validation(format!("slug '{slug}' is already taken"))
}

fn already_member() -> DaoError {
    DaoError::DuplicateKey("User is already a member of this organization".to_string())
}

fn require_owner_to_grant_owner(caller: MemberRole, granted: MemberRole) -> DaoResult<()> {
    if granted == MemberRole::Owner && caller != MemberRole::Owner {
        return Err(DaoError::Forbidden(
            "Only an owner can grant the owner role".to_string(),
        ));
    }
    Ok(())
}
