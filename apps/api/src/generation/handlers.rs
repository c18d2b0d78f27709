//! Axum route handlers for the Generation API.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::{generate_and_record, GenerationOutcome, OutputType, Topic};
use crate::identity::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default)]
    pub output_type: OutputType,
}

/// POST /api/v1/generations
///
/// The topic is checked before the caller's session, so a blank topic never
/// reaches the identity provider or the model.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let topic = Topic::parse(&request.topic)?;
    let AuthUser(principal) = AuthUser::from_headers(&state, &headers).await?;
    let generator = state.generator()?;

    let outcome = generate_and_record(
        generator,
        state.history().ok(),
        &principal,
        &topic,
        request.output_type,
    )
    .await?;

    Ok(Json(outcome))
}
