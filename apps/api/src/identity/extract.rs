//! Axum extractors for bearer-authenticated routes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{IdentityError, Principal};
use crate::errors::AppError;
use crate::state::AppState;

/// Shown when a protected action is attempted without a valid session.
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to generate content.";

/// The raw bearer token from `Authorization`. Not validated.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| BearerToken(t.to_string()))
            .ok_or_else(|| AppError::Unauthorized(LOGIN_REQUIRED_MESSAGE.to_string()))
    }
}

/// The principal behind a request, resolved through the identity provider.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    /// Token presence is checked before the provider is contacted.
    pub async fn from_headers(state: &AppState, headers: &HeaderMap) -> Result<Self, AppError> {
        let BearerToken(token) = BearerToken::from_headers(headers)?;
        let identity = state.identity()?;
        match identity.principal(&token).await {
            Ok(principal) => Ok(AuthUser(principal)),
            Err(IdentityError::Unauthenticated) => {
                Err(AppError::Unauthorized(LOGIN_REQUIRED_MESSAGE.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, AppError> {
        BearerToken::from_headers(&parts.headers)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        AuthUser::from_headers(state, &parts.headers).await
    }
}
