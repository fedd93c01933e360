use std::sync::Arc;

use crate::assistant::ResumeAssistant;
use crate::config::Config;
use crate::export::PdfExporter;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    /// Heuristic by default; model-backed when `ANTHROPIC_API_KEY` is set.
    pub assistant: Arc<dyn ResumeAssistant>,
    pub exporter: Arc<PdfExporter>,
    #[allow(dead_code)]
    pub config: Config,
}
