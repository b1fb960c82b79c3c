use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use bson::oid::ObjectId;
use kanflow_services::auth::Claims;

use crate::{error::ApiError, state::AppState};

/// The authenticated caller, from a Bearer header or the `access_token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub email: String,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = state.auth.verify_access_token(&token)?;
        let user_id = claims.user_id()?;

        Ok(AuthUser {
            user_id,
            email: claims.email.clone(),
            claims,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|cookie| {
                    cookie
                        .trim()
                        .strip_prefix("access_token=")
                        .map(|s| s.to_string())
                })
        })
}
