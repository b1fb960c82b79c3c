use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kanflow_db::models::{MemberRole, OrganizationMember};
use kanflow_services::organization::AddMember;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, parse_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub organization_id: String,
    pub user_id: String,
    pub role: MemberRole,
    pub invited_by: Option<String>,
    pub joined_at: String,
}

pub fn to_response(m: OrganizationMember) -> MemberResponse {
    MemberResponse {
        organization_id: m.organization_id.to_hex(),
        user_id: m.user_id.to_hex(),
        role: m.role,
        invited_by: m.invited_by.map(|id| id.to_hex()),
        joined_at: m.joined_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let members = state.organizations.list_members(auth.user_id, oid).await?;
    Ok(Json(members.into_iter().map(to_response).collect()))
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let user_id = parse_id(&body.user_id, "user_id")?;

    let member = state
        .organizations
        .add_member(
            auth.user_id,
            oid,
            AddMember {
                user_id,
                role: body.role,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(member))))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((organization_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let target = parse_id(&user_id, "user_id")?;
    state
        .organizations
        .remove_member(auth.user_id, oid, target)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
