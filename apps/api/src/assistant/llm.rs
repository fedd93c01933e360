//! Model-backed assistant. Prompts live in [`super::prompts`]; transport and
//! retries in [`crate::llm_client`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::assistant::heuristic::category_for;
use crate::assistant::prompts::{
    ATS_PROMPT_TEMPLATE, ATS_SYSTEM, GENERATE_PROMPT_TEMPLATE, GENERATE_SYSTEM,
};
use crate::assistant::{GenerationRequest, ResumeAssistant};
use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::{clamp_score, AtsScoreRecord, ResumeDocument};
use crate::store::ResumePatch;

const NO_JOB_DESCRIPTION: &str = "(none provided; score general ATS readiness)";

/// Score payload as the model sends it. Scores arrive as any JSON number.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelScore {
    score: f64,
    suggestions: Vec<String>,
    keywords: Vec<String>,
}

impl From<ModelScore> for AtsScoreRecord {
    fn from(raw: ModelScore) -> Self {
        AtsScoreRecord {
            score: clamp_score(raw.score),
            suggestions: raw.suggestions,
            keywords: raw.keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

pub struct LlmAssistant {
    client: LlmClient,
}

impl LlmAssistant {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

pub fn build_generate_prompt(request: &GenerationRequest) -> String {
    let job_title = request
        .job_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("(not specified)");
    GENERATE_PROMPT_TEMPLATE
        .replace("{description}", request.description.trim())
        .replace("{job_title}", job_title)
}

pub fn build_ats_prompt(
    document: &ResumeDocument,
    job_description: Option<&str>,
) -> Result<String, AppError> {
    // The photo is irrelevant to scoring and can be megabytes of base64.
    let mut trimmed = document.clone();
    trimmed.personal_info.profile_image.clear();
    let resume_json = serde_json::to_string_pretty(&trimmed)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize résumé: {e}")))?;

    Ok(ATS_PROMPT_TEMPLATE
        .replace("{resume_json}", &resume_json)
        .replace("{job_description}", job_description.unwrap_or(NO_JOB_DESCRIPTION)))
}

/// Fills categories the model left blank from the known vocabulary.
fn tidy_patch(mut patch: ResumePatch) -> ResumePatch {
    if let Some(skills) = patch.skills.as_mut() {
        skills.retain(|s| !s.name.trim().is_empty());
        for skill in skills.iter_mut() {
            if skill.category.trim().is_empty() {
                skill.category = category_for(&skill.name).to_string();
            }
        }
    }
    patch
}

fn assistant_error(e: LlmError) -> AppError {
    AppError::Assistant(e.to_string())
}

#[async_trait]
impl ResumeAssistant for LlmAssistant {
    fn name(&self) -> &'static str {
        "llm"
    }

    #[instrument(skip_all, fields(description_len = request.description.len()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<ResumePatch, AppError> {
        let prompt = build_generate_prompt(request);
        let patch: ResumePatch = self
            .client
            .call_json(&prompt, GENERATE_SYSTEM)
            .await
            .map_err(assistant_error)?;
        info!(
            skills = patch.skills.as_ref().map_or(0, Vec::len),
            experience = patch.experience.as_ref().map_or(0, Vec::len),
            "Model generated résumé patch"
        );
        Ok(tidy_patch(patch))
    }

    #[instrument(skip_all, fields(with_job_description = job_description.is_some()))]
    async fn score(
        &self,
        document: &ResumeDocument,
        job_description: Option<&str>,
    ) -> Result<AtsScoreRecord, AppError> {
        let prompt = build_ats_prompt(document, job_description)?;
        let raw: ModelScore = self
            .client
            .call_json(&prompt, ATS_SYSTEM)
            .await
            .map_err(assistant_error)?;
        Ok(raw.into())
    }
}
