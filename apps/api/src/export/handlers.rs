use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/resume/export
/// Returns the current résumé as a paginated A4 PDF attachment.
pub async fn handle_export_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    // The export works on this snapshot; later edits do not affect it.
    let snapshot = state.store.snapshot();
    info!(template = %snapshot.resume.template, "Export requested");

    let pdf = state
        .exporter
        .export(snapshot, Utc::now().date_naive())
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        pdf.filename.replace(['"', '\\'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf.bytes,
    )
        .into_response())
}
