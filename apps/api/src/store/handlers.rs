use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{AppSnapshot, EducationEntry, ExperienceEntry, ProjectEntry, SkillEntry};
use crate::state::AppState;
use crate::store::actions::{PersonalInfoPatch, ResumeAction};

#[derive(Deserialize)]
pub struct TextBody {
    pub text: String,
}

#[derive(Deserialize)]
pub struct TemplateBody {
    pub template: String,
}

#[derive(Deserialize)]
pub struct ImageUrlBody {
    pub url: String,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<AppSnapshot> {
    Json(state.store.snapshot().as_ref().clone())
}

/// DELETE /api/v1/resume
pub async fn handle_reset(State(state): State<AppState>) -> Json<AppSnapshot> {
    info!("Resetting résumé to defaults");
    Json(state.store.dispatch(ResumeAction::Reset).as_ref().clone())
}

/// PATCH /api/v1/resume/personal-info
pub async fn handle_update_personal_info(
    State(state): State<AppState>,
    Json(patch): Json<PersonalInfoPatch>,
) -> Result<Json<AppSnapshot>, AppError> {
    // Images go through the validated profile-image routes only.
    if patch.profile_image.is_some() {
        return Err(AppError::BadRequest(
            "profileImage must be set via /api/v1/resume/profile-image".to_string(),
        ));
    }
    let snapshot = state.store.dispatch(ResumeAction::UpdatePersonalInfo(patch));
    Ok(Json(snapshot.as_ref().clone()))
}

/// PUT /api/v1/resume/summary
pub async fn handle_update_summary(
    State(state): State<AppState>,
    Json(body): Json<TextBody>,
) -> Json<AppSnapshot> {
    let snapshot = state.store.dispatch(ResumeAction::UpdateSummary(body.text));
    Json(snapshot.as_ref().clone())
}

/// PUT /api/v1/resume/skills-description
pub async fn handle_update_skills_description(
    State(state): State<AppState>,
    Json(body): Json<TextBody>,
) -> Json<AppSnapshot> {
    let snapshot = state
        .store
        .dispatch(ResumeAction::SetSkillsDescription(body.text));
    Json(snapshot.as_ref().clone())
}

/// PUT /api/v1/resume/experience
pub async fn handle_replace_experience(
    State(state): State<AppState>,
    Json(entries): Json<Vec<ExperienceEntry>>,
) -> Result<Json<AppSnapshot>, AppError> {
    let snapshot = state.store.replace_experience(entries)?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// PUT /api/v1/resume/education
pub async fn handle_replace_education(
    State(state): State<AppState>,
    Json(entries): Json<Vec<EducationEntry>>,
) -> Result<Json<AppSnapshot>, AppError> {
    let snapshot = state.store.replace_education(entries)?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// PUT /api/v1/resume/skills
pub async fn handle_replace_skills(
    State(state): State<AppState>,
    Json(entries): Json<Vec<SkillEntry>>,
) -> Result<Json<AppSnapshot>, AppError> {
    let snapshot = state.store.replace_skills(entries)?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// PUT /api/v1/resume/projects
pub async fn handle_replace_projects(
    State(state): State<AppState>,
    Json(entries): Json<Vec<ProjectEntry>>,
) -> Result<Json<AppSnapshot>, AppError> {
    let snapshot = state.store.replace_projects(entries)?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// PUT /api/v1/resume/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Json(body): Json<TemplateBody>,
) -> Json<AppSnapshot> {
    let snapshot = state.store.dispatch(ResumeAction::SetTemplate(body.template));
    Json(snapshot.as_ref().clone())
}

/// POST /api/v1/resume/profile-image
/// Expects a multipart form with a single `image` file field.
pub async fn handle_upload_profile_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AppSnapshot>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        info!(content_type = %content_type, bytes = bytes.len(), "Profile image upload");
        let snapshot = state.store.upload_profile_image(&content_type, &bytes)?;
        return Ok(Json(snapshot.as_ref().clone()));
    }

    Err(AppError::BadRequest(
        "Multipart field 'image' is required".to_string(),
    ))
}

/// PUT /api/v1/resume/profile-image/url
pub async fn handle_set_profile_image_url(
    State(state): State<AppState>,
    Json(body): Json<ImageUrlBody>,
) -> Result<Json<AppSnapshot>, AppError> {
    let snapshot = state.store.set_profile_image_url(&body.url)?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// DELETE /api/v1/resume/profile-image
pub async fn handle_remove_profile_image(State(state): State<AppState>) -> Json<AppSnapshot> {
    Json(state.store.remove_profile_image().as_ref().clone())
}
