pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::export::handlers as export;
use crate::state::AppState;
use crate::store::handlers as resume;
use crate::templates::handlers as templates;

/// Body cap for the upload route. Images over 2 MiB must still reach
/// validation and come back as 400, not 413.
const UPLOAD_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume).delete(resume::handle_reset),
        )
        .route(
            "/api/v1/resume/personal-info",
            patch(resume::handle_update_personal_info),
        )
        .route("/api/v1/resume/summary", put(resume::handle_update_summary))
        .route(
            "/api/v1/resume/experience",
            put(resume::handle_replace_experience),
        )
        .route(
            "/api/v1/resume/education",
            put(resume::handle_replace_education),
        )
        .route("/api/v1/resume/skills", put(resume::handle_replace_skills))
        .route(
            "/api/v1/resume/projects",
            put(resume::handle_replace_projects),
        )
        .route("/api/v1/resume/template", put(resume::handle_set_template))
        .route(
            "/api/v1/resume/skills-description",
            put(resume::handle_update_skills_description),
        )
        .route(
            "/api/v1/resume/profile-image",
            post(resume::handle_upload_profile_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .merge(delete(resume::handle_remove_profile_image)),
        )
        .route(
            "/api/v1/resume/profile-image/url",
            put(resume::handle_set_profile_image_url),
        )
        // Templates and layout
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/resume/layout", get(templates::handle_get_layout))
        // Assistant
        .route(
            "/api/v1/assistant/generate",
            post(assistant::handle_generate),
        )
        .route("/api/v1/assistant/ats", post(assistant::handle_ats))
        // Export
        .route("/api/v1/resume/export", get(export::handle_export_pdf))
        .with_state(state)
}
