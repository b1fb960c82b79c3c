use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kanflow_db::models::{Organization, Plan};
use kanflow_services::organization::{CreateOrganization, UpdateOrganization};
use serde::Serialize;

use crate::{
    error::{ApiError, parse_id},
    extractors::auth::AuthUser,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub owner_id: String,
    pub plan: Plan,
    pub created_at: String,
}

fn to_response(o: Organization) -> OrganizationResponse {
    OrganizationResponse {
        id: o.id.map(|id| id.to_hex()).unwrap_or_default(),
        name: o.name,
        slug: o.slug,
        description: o.description,
        website: o.website,
        phone: o.phone,
        email: o.email,
        owner_id: o.owner_id.to_hex(),
        plan: o.plan,
        created_at: o.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrganizationResponse>>, ApiError> {
    let organizations = state.organizations.list(auth.user_id).await?;
    Ok(Json(organizations.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateOrganization>,
) -> Result<(StatusCode, Json<OrganizationResponse>), ApiError> {
    let organization = state.organizations.create(auth.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(to_response(organization))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
) -> Result<Json<OrganizationResponse>, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let organization = state.organizations.get(auth.user_id, oid).await?;
    Ok(Json(to_response(organization)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
    Json(body): Json<UpdateOrganization>,
) -> Result<Json<OrganizationResponse>, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    let organization = state.organizations.update(auth.user_id, oid, body).await?;
    Ok(Json(to_response(organization)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organization_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let oid = parse_id(&organization_id, "organization_id")?;
    state.organizations.delete(auth.user_id, oid).await?;
    Ok(StatusCode::NO_CONTENT)
}
