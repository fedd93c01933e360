//! Generation and ATS-scoring collaborators.
//!
//! A [`ResumeAssistant`] turns free text into a [`ResumePatch`] and scores a
//! document. The store never calls one directly; [`run_generation`] and
//! [`run_ats_analysis`] drive the flows and own the `is_generating` flag.
//! Only one flow runs at a time; a second is rejected with `Conflict`.

pub mod handlers;
pub mod heuristic;
pub mod llm;
pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{AppSnapshot, AtsScoreRecord, ResumeDocument};
use crate::store::actions::ResumeAction;
use crate::store::{DocumentStore, ResumePatch};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationRequest {
    pub description: String,
    pub job_title: Option<String>,
}

#[async_trait]
pub trait ResumeAssistant: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest) -> Result<ResumePatch, AppError>;

    /// Scores `document`, optionally against a job description.
    async fn score(
        &self,
        document: &ResumeDocument,
        job_description: Option<&str>,
    ) -> Result<AtsScoreRecord, AppError>;
}

/// Holds `is_generating` high for its lifetime. Dropping it clears the flag,
/// including when the owning future is cancelled.
struct GeneratingFlag<'a> {
    store: &'a DocumentStore,
}

impl<'a> GeneratingFlag<'a> {
    fn raise(store: &'a DocumentStore) -> Result<Self, AppError> {
        match store.try_begin_generation() {
            Some(_) => Ok(Self { store }),
            None => Err(AppError::Conflict(
                "A generation or analysis is already in progress".to_string(),
            )),
        }
    }
}

impl Drop for GeneratingFlag<'_> {
    fn drop(&mut self) {
        self.store.dispatch(ResumeAction::SetGenerating(false));
    }
}

/// Generate → apply patch → baseline score.
pub async fn run_generation(
    store: &DocumentStore,
    assistant: &dyn ResumeAssistant,
    request: &GenerationRequest,
) -> Result<Arc<AppSnapshot>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "description must not be empty".to_string(),
        ));
    }

    {
        let _flag = GeneratingFlag::raise(store)?;

        let patch = assistant.generate(request).await?;
        let updated = store.apply_generated_patch(patch)?;
        let record = assistant.score(&updated.resume, None).await?;
        info!(
            assistant = assistant.name(),
            score = record.score,
            "Generated résumé content"
        );
        store.dispatch(ResumeAction::SetAtsScore(record));
    }

    Ok(store.snapshot())
}

/// Scores the current document against `job_description` and stores the record.
pub async fn run_ats_analysis(
    store: &DocumentStore,
    assistant: &dyn ResumeAssistant,
    job_description: &str,
) -> Result<Arc<AppSnapshot>, AppError> {
    {
        let _flag = GeneratingFlag::raise(store)?;

        let document = store.snapshot().resume.clone();
        let jd = Some(job_description.trim()).filter(|s| !s.is_empty());
        let record = assistant.score(&document, jd).await?;
        info!(assistant = assistant.name(), score = record.score, "ATS analysis complete");
        store.dispatch(ResumeAction::SetAtsScore(record));
    }

    Ok(store.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::persistence::MemorySnapshotStore;
    use heuristic::HeuristicAssistant;

    struct BrokenAssistant;

    #[async_trait]
    impl ResumeAssistant for BrokenAssistant {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<ResumePatch, AppError> {
            Err(AppError::Assistant("upstream unavailable".to_string()))
        }

        async fn score(
            &self,
            _document: &ResumeDocument,
            _job_description: Option<&str>,
        ) -> Result<AtsScoreRecord, AppError> {
            Err(AppError::Assistant("upstream unavailable".to_string()))
        }
    }

    fn store() -> DocumentStore {
        DocumentStore::open(Arc::new(MemorySnapshotStore::new()))
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            description: "Senior engineer with Python, SQL and React experience; strong leadership."
                .to_string(),
            job_title: Some("Data Engineer".to_string()),
        }
    }

    #[tokio::test]
    async fn test_generation_applies_patch_and_scores() {
        let store = store();
        let snapshot = run_generation(&store, &HeuristicAssistant, &request())
            .await
            .unwrap();

        assert!(!snapshot.is_generating);
        assert_eq!(snapshot.resume.experience[0].position, "Data Engineer");
        assert!(snapshot.resume.experience[0].id.starts_with("exp-"));
        assert!(snapshot.resume.skills.iter().any(|s| s.name == "Python"));
        // summary > 50 chars, 4 skills, 1 experience: 60 + 10 + 10 + 15.
        assert_eq!(snapshot.ats_score.score, 95);
    }

    #[tokio::test]
    async fn test_generation_keeps_existing_projects() {
        let store = store();
        store
            .replace_projects(vec![crate::models::ProjectEntry {
                name: "Vellum".to_string(),
                ..Default::default()
            }])
            .unwrap();
        let snapshot = run_generation(&store, &HeuristicAssistant, &request())
            .await
            .unwrap();
        assert_eq!(snapshot.resume.projects.len(), 1);
    }

    #[tokio::test]
    async fn test_flag_cleared_when_assistant_fails() {
        let store = store();
        let before = store.snapshot().resume.clone();
        let err = run_generation(&store, &BrokenAssistant, &request())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Assistant(_)));
        assert!(!store.snapshot().is_generating);
        assert_eq!(store.snapshot().resume, before);
    }

    struct StalledAssistant;

    #[async_trait]
    impl ResumeAssistant for StalledAssistant {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<ResumePatch, AppError> {
            std::future::pending().await
        }

        async fn score(
            &self,
            _document: &ResumeDocument,
            _job_description: Option<&str>,
        ) -> Result<AtsScoreRecord, AppError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_flag_cleared_when_generation_is_cancelled() {
        let store = store();
        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            run_generation(&store, &StalledAssistant, &request()),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(!store.snapshot().is_generating);
    }

    #[tokio::test]
    async fn test_overlapping_generation_is_rejected() {
        let store = store();
        let stalled_request = request();
        let mut first = Box::pin(run_generation(&store, &StalledAssistant, &stalled_request));
        {
            let pending = tokio::time::timeout(std::time::Duration::from_millis(10), &mut first).await;
            assert!(pending.is_err());
            assert!(store.snapshot().is_generating);

            let err = run_generation(&store, &HeuristicAssistant, &request())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
            let err = run_ats_analysis(&store, &HeuristicAssistant, "Python")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));

            // The rejected callers must not clear the running flow's flag.
            assert!(store.snapshot().is_generating);
            assert!(store.snapshot().resume.experience.is_empty());
        }
        drop(first);
        assert!(!store.snapshot().is_generating);

        run_generation(&store, &HeuristicAssistant, &request())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_description_rejected() {
        let store = store();
        let err = run_generation(&store, &HeuristicAssistant, &GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!store.snapshot().is_generating);
    }

    #[tokio::test]
    async fn test_ats_analysis_stores_keywords() {
        let store = store();
        run_generation(&store, &HeuristicAssistant, &request())
            .await
            .unwrap();
        let snapshot = run_ats_analysis(
            &store,
            &HeuristicAssistant,
            "We need Python and SQL skills plus teamwork.",
        )
        .await
        .unwrap();
        assert!(snapshot.ats_score.keywords.contains(&"python".to_string()));
        assert!(!snapshot.is_generating);
    }
}
