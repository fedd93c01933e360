//! Canonical résumé document and the persisted application snapshot.
//!
//! Field names serialize in camelCase so the persisted blob keeps the shape
//! `{resume, atsScore, isGenerating, skillsDescription}`.

use serde::{Deserialize, Serialize};

use crate::models::ats::AtsScoreRecord;
use crate::templates::registry::DEFAULT_TEMPLATE_ID;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub website: String,
    /// Empty, a `data:` URI, or an external image URL.
    pub profile_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: String,
    pub company: String,
    pub position: String,
    pub start_date: String,
    /// Not authoritative while `current` is true.
    pub end_date: String,
    pub current: bool,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub graduation_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillEntry {
    pub id: String,
    pub name: String,
    pub level: SkillLevel,
    /// Free-form grouping label.
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub projects: Vec<ProjectEntry>,
    pub template: String,
}

impl Default for ResumeDocument {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            template: DEFAULT_TEMPLATE_ID.to_string(),
        }
    }
}

/// Everything the store owns and persists as a single blob.
///
/// `is_generating` is a transient UI flag; it rides along in the blob but
/// carries no domain meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSnapshot {
    pub resume: ResumeDocument,
    pub ats_score: AtsScoreRecord,
    pub is_generating: bool,
    pub skills_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_uses_default_template() {
        let doc = ResumeDocument::default();
        assert_eq!(doc.template, DEFAULT_TEMPLATE_ID);
        assert!(doc.experience.is_empty());
        assert!(doc.personal_info.full_name.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(AppSnapshot::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("resume"));
        assert!(obj.contains_key("atsScore"));
        assert!(obj.contains_key("isGenerating"));
        assert!(obj.contains_key("skillsDescription"));
        assert!(json["resume"]["personalInfo"]
            .as_object()
            .unwrap()
            .contains_key("profileImage"));
    }

    #[test]
    fn test_partial_blob_fills_missing_fields_with_defaults() {
        let json = r#"{"resume": {"summary": "Builder of things"}}"#;
        let snapshot: AppSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.resume.summary, "Builder of things");
        assert_eq!(snapshot.resume.template, DEFAULT_TEMPLATE_ID);
        assert_eq!(snapshot.ats_score, AtsScoreRecord::default());
    }

    #[test]
    fn test_skill_level_serde_uses_display_names() {
        let level: SkillLevel = serde_json::from_str(r#""Expert""#).unwrap();
        assert_eq!(level, SkillLevel::Expert);
        assert_eq!(level.as_str(), "Expert");
        assert!(serde_json::from_str::<SkillLevel>(r#""Guru""#).is_err());
    }
}
