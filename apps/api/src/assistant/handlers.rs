use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::assistant::{run_ats_analysis, run_generation, GenerationRequest};
use crate::errors::AppError;
use crate::models::AppSnapshot;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtsRequest {
    pub job_description: String,
}

/// POST /api/v1/assistant/generate
/// Fills summary, skills and experience from a free-text description, then
/// records a baseline ATS score.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<AppSnapshot>, AppError> {
    info!(
        assistant = state.assistant.name(),
        job_title = request.job_title.as_deref().unwrap_or(""),
        "Generation requested"
    );
    let snapshot = run_generation(&state.store, state.assistant.as_ref(), &request).await?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// POST /api/v1/assistant/ats
pub async fn handle_ats(
    State(state): State<AppState>,
    Json(body): Json<AtsRequest>,
) -> Result<Json<AppSnapshot>, AppError> {
    let snapshot =
        run_ats_analysis(&state.store, state.assistant.as_ref(), &body.job_description).await?;
    Ok(Json(snapshot.as_ref().clone()))
}
