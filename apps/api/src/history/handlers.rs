//! Axum route handlers for the History API.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::identity::AuthUser;
use crate::models::generation::Generation;
use crate::state::AppState;

/// GET /api/v1/generations
///
/// The signed-in user's generations, most recent first.
pub async fn handle_list_generations(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<Generation>>, AppError> {
    let generations = state.history()?.list(principal.id).await?;
    Ok(Json(generations))
}
