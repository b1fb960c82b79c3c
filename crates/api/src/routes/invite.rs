use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kanflow_db::models::{Invitation, InvitationStatus, MemberRole};
use kanflow_services::organization::InviteMember;
use serde::Serialize;

use super::member::{MemberResponse, to_response as member_response};
use crate::{
    error::{ApiError, parse_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub role: MemberRole,
    pub token: String,
    pub status: InvitationStatus,
    pub created_at: String,
}

fn to_response(i: Invitation) -> InvitationResponse {
    InvitationResponse {
        id: i.id.map(|id| id.to_hex()).unwrap_or_default(),
        organization_id: i.organization_id.to_hex(),
        email: i.email,
        role: i.role,
        token: i.token,
        status: i.status,
        created_at: i.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let invitations = state
        .organizations
        .list_invitations(auth.user_id, oid)
        .await?;
    Ok(Json(invitations.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
    Json(body): Json<InviteMember>,
) -> Result<(StatusCode, Json<InvitationResponse>), ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let invitation = state.organizations.invite(auth.user_id, oid, body).await?;
    Ok((StatusCode::CREATED, Json(to_response(invitation))))
}

pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = state
        .organizations
        .accept_invite(auth.user_id, &token)
        .await?;
    Ok(Json(member_response(member)))
}
