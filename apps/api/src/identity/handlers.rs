//! Axum route handlers for the Auth API.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::identity::{AuthUser, BearerToken, IdentityError, Principal, Session};
use crate::state::AppState;

pub const CONFIRMATION_SENT_MESSAGE: &str = "Check your email for the confirmation link!";

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub message: &'static str,
    pub confirmation_required: bool,
}

/// POST /api/v1/auth/sign-up
///
/// Starts the email confirmation flow. Never returns a session.
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    request.validate()?;

    let outcome = state
        .identity()?
        .sign_up(request.email.trim(), &request.password)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SignUpResponse {
            message: CONFIRMATION_SENT_MESSAGE,
            confirmation_required: outcome.confirmation_required,
        }),
    ))
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Session>, AppError> {
    request.validate()?;

    let session = state
        .identity()?
        .sign_in(request.email.trim(), &request.password)
        .await
        .map_err(|e| match e {
            // Rejected credentials are a 401 carrying the provider's own message
            IdentityError::Provider { status, message } if (400..429).contains(&status) => {
                AppError::Unauthorized(message)
            }
            e => e.into(),
        })?;

    Ok(Json(session))
}

/// POST /api/v1/auth/sign-out
///
/// The client discards its token regardless, so a provider failure is only logged.
pub async fn handle_sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AppError> {
    if let Err(e) = state.identity()?.sign_out(&token).await {
        warn!("Sign-out failed at identity provider: {e}");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(AuthUser(principal): AuthUser) -> Json<Principal> {
    Json(principal)
}
