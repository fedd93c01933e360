use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::templates::registry::{self, TemplateDescriptor};
use crate::templates::{resolve_layout, ResolvedLayout};

#[derive(Deserialize)]
pub struct TemplateQuery {
    pub industry: Option<String>,
}

#[derive(Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<&'static TemplateDescriptor>,
    pub industries: Vec<&'static str>,
}

/// GET /api/v1/templates[?industry=]
pub async fn handle_list_templates(Query(params): Query<TemplateQuery>) -> Json<TemplateListResponse> {
    let templates = match params.industry.as_deref().map(str::trim) {
        Some(industry) if !industry.is_empty() => registry::templates_for_industry(industry),
        _ => registry::all().iter().collect(),
    };
    Json(TemplateListResponse {
        templates,
        industries: registry::industries(),
    })
}

/// GET /api/v1/resume/layout
/// Resolves the current document against its selected template.
pub async fn handle_get_layout(State(state): State<AppState>) -> Json<ResolvedLayout> {
    let snapshot = state.store.snapshot();
    let template = registry::lookup(&snapshot.resume.template);
    Json(resolve_layout(&snapshot.resume, template))
}
