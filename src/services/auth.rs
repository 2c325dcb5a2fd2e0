//! Bearer-token extractors used by the route handlers.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::modules::accounts::{crud::AccountCrud, model::Account};
use crate::services::response::ErrorResponse;
use crate::AppState;

/// Caller identity taken from a valid access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Like [`AuthUser`] but anonymous requests (or unusable tokens) yield `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

/// An active staff account.
#[derive(Debug, Clone)]
pub struct StaffUser(pub Account);

#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
    Forbidden,
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Authentication credentials were not provided"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "You do not have permission to perform this action"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

/// Verifies the bearer token and loads its account. Deleted or deactivated accounts are refused.
async fn active_account(parts: &Parts, state: &AppState) -> Result<Account, AuthRejection> {
    let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;
    let claims = state
        .jwt_service
        .verify_access_token(token)
        .map_err(|_| AuthRejection::InvalidToken)?;

    let account = AccountCrud::new(state.db.clone())
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to load account for token");
            AuthRejection::Internal
        })?
        .ok_or(AuthRejection::InvalidToken)?;

    if !account.is_active {
        tracing::debug!(account_id = %account.id, "token of inactive account refused");
        return Err(AuthRejection::InvalidToken);
    }
    Ok(account)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let account = active_account(parts, state).await?;
        Ok(Self {
            id: account.id,
            email: account.email,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        Ok(Self(AuthUser::from_request_parts(parts, state).await.ok()))
    }
}

impl FromRequestParts<Arc<AppState>> for StaffUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let account = active_account(parts, state).await?;
        if !account.is_staff {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(account))
    }
}
