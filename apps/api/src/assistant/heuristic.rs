//! Deterministic assistant used when no model API key is configured.
//!
//! Skills come from a fixed vocabulary; the score is a small additive rubric
//! over the document's shape, optionally blended with keyword coverage of a
//! job description.

use async_trait::async_trait;

use crate::assistant::{GenerationRequest, ResumeAssistant};
use crate::errors::AppError;
use crate::models::{AtsScoreRecord, ExperienceEntry, ResumeDocument, SkillEntry, SkillLevel};
use crate::store::ResumePatch;

/// Recognized skills and their display category, in detection order.
const SKILL_VOCABULARY: [(&str, &str); 15] = [
    ("JavaScript", "Technical"),
    ("React", "Technical"),
    ("Node.js", "Technical"),
    ("Python", "Technical"),
    ("HTML", "Technical"),
    ("CSS", "Technical"),
    ("SQL", "Technical"),
    ("Project Management", "Business"),
    ("Communication", "Soft Skills"),
    ("Leadership", "Soft Skills"),
    ("Problem Solving", "Soft Skills"),
    ("Data Analysis", "Other"),
    ("Marketing", "Business"),
    ("Sales", "Business"),
    ("Customer Service", "Business"),
];

/// Generic screening terms looked for in job descriptions.
const ATS_TERMS: [&str; 6] = [
    "leadership",
    "management",
    "development",
    "analysis",
    "communication",
    "teamwork",
];

const BASE_SCORE: u8 = 60;
const MAX_BASELINE_SCORE: u8 = 95;

const BASELINE_SUGGESTIONS: [&str; 3] = [
    "Add more quantifiable achievements",
    "Include relevant keywords from job descriptions",
    "Ensure consistent formatting",
];

const JOB_MATCH_SUGGESTIONS: [&str; 5] = [
    "Add more relevant keywords from the job description",
    "Include quantifiable achievements with numbers",
    "Use action verbs to start bullet points",
    "Ensure consistent formatting throughout",
    "Include relevant technical skills",
];

const SUMMARY_TAIL: &str = "Proven track record of delivering high-quality results and driving \
    business growth. Passionate about leveraging technology to solve complex problems and create value.";

pub struct HeuristicAssistant;

/// Category label for a skill name; unknown names are "Other".
pub fn category_for(skill: &str) -> &'static str {
    SKILL_VOCABULARY
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(skill))
        .map_or("Other", |(_, category)| category)
}

/// How often `term` appears in `text_lower`. Single words match inside any
/// whitespace-separated token; phrases match as substrings.
fn mentions(text_lower: &str, term: &str) -> usize {
    let term = term.to_lowercase();
    if term.contains(' ') {
        text_lower.matches(term.as_str()).count()
    } else {
        text_lower
            .split_whitespace()
            .filter(|word| word.contains(term.as_str()))
            .count()
    }
}

/// Vocabulary skills mentioned in `description`, in vocabulary order. More
/// mentions read as more proficiency.
pub fn detect_skills(description: &str) -> Vec<SkillEntry> {
    let text = description.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter_map(|(name, category)| {
            let level = match mentions(&text, name) {
                0 => return None,
                1 => SkillLevel::Intermediate,
                2 => SkillLevel::Advanced,
                _ => SkillLevel::Expert,
            };
            Some(SkillEntry {
                id: String::new(),
                name: name.to_string(),
                level,
                category: category.to_string(),
            })
        })
        .collect()
}

fn synthesize_experience(job_title: Option<&str>) -> ExperienceEntry {
    let position = job_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Professional");
    ExperienceEntry {
        id: String::new(),
        company: "Previous Company".to_string(),
        position: position.to_string(),
        start_date: "2022-01".to_string(),
        end_date: "2024-01".to_string(),
        current: false,
        description: "Responsible for various tasks and responsibilities that align with the \
                      described experience."
            .to_string(),
        achievements: vec![
            "Improved efficiency by implementing new processes".to_string(),
            "Collaborated with cross-functional teams to deliver projects".to_string(),
            "Mentored junior team members and provided guidance".to_string(),
        ],
    }
}

fn summarize(skills: &[SkillEntry]) -> String {
    if skills.is_empty() {
        return format!("Experienced professional. {SUMMARY_TAIL}");
    }
    let top: Vec<&str> = skills.iter().take(3).map(|s| s.name.as_str()).collect();
    format!(
        "Experienced professional with expertise in {}. {SUMMARY_TAIL}",
        top.join(", ")
    )
}

/// 60 base, +10 for a summary over 50 characters, +10 for more than three
/// skills, +15 for any experience; capped at 95.
pub fn baseline_score(document: &ResumeDocument) -> u8 {
    let mut score = BASE_SCORE;
    if document.summary.chars().count() > 50 {
        score += 10;
    }
    if document.skills.len() > 3 {
        score += 10;
    }
    if !document.experience.is_empty() {
        score += 15;
    }
    score.min(MAX_BASELINE_SCORE)
}

fn document_text(document: &ResumeDocument) -> String {
    let mut parts: Vec<&str> = vec![document.summary.as_str()];
    for e in &document.experience {
        parts.extend([e.position.as_str(), e.company.as_str(), e.description.as_str()]);
        parts.extend(e.achievements.iter().map(String::as_str));
    }
    for p in &document.projects {
        parts.extend([p.name.as_str(), p.description.as_str()]);
        parts.extend(p.technologies.iter().map(String::as_str));
    }
    for e in &document.education {
        parts.extend([e.degree.as_str(), e.field.as_str()]);
    }
    parts.extend(document.skills.iter().map(|s| s.name.as_str()));
    parts.join(" ").to_lowercase()
}

/// Lowercased vocabulary and screening terms present in `job_description`.
pub fn job_keywords(job_description: &str) -> Vec<String> {
    let text = job_description.to_lowercase();
    let skills = SKILL_VOCABULARY.iter().map(|(name, _)| name.to_lowercase());
    let terms = ATS_TERMS.iter().map(|t| t.to_string());

    let mut out: Vec<String> = Vec::new();
    for term in skills.chain(terms) {
        if mentions(&text, &term) > 0 && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

pub fn score_document(document: &ResumeDocument, job_description: Option<&str>) -> AtsScoreRecord {
    let baseline = baseline_score(document);

    let Some(jd) = job_description else {
        return AtsScoreRecord {
            score: baseline,
            suggestions: BASELINE_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            keywords: ATS_TERMS[..5].iter().map(|s| s.to_string()).collect(),
        };
    };

    let keywords = job_keywords(jd);
    let text = document_text(document);
    let missing: Vec<&str> = keywords
        .iter()
        .filter(|k| mentions(&text, k) == 0)
        .map(String::as_str)
        .collect();

    let coverage = if keywords.is_empty() {
        1.0
    } else {
        (keywords.len() - missing.len()) as f32 / keywords.len() as f32
    };
    let score = (f32::from(baseline) * 0.6 + coverage * 100.0 * 0.4)
        .round()
        .clamp(0.0, 100.0) as u8;

    let mut suggestions: Vec<String> = Vec::new();
    if !missing.is_empty() {
        suggestions.push(format!("Mention missing keywords: {}", missing.join(", ")));
    }
    suggestions.extend(JOB_MATCH_SUGGESTIONS.iter().map(|s| s.to_string()));

    AtsScoreRecord {
        score,
        suggestions,
        keywords,
    }
}

#[async_trait]
impl ResumeAssistant for HeuristicAssistant {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<ResumePatch, AppError> {
        let skills = detect_skills(&request.description);
        let experience = synthesize_experience(request.job_title.as_deref());
        Ok(ResumePatch {
            summary: Some(summarize(&skills)),
            skills: Some(skills),
            experience: Some(vec![experience]),
            education: None,
            projects: None,
        })
    }

    async fn score(
        &self,
        document: &ResumeDocument,
        job_description: Option<&str>,
    ) -> Result<AtsScoreRecord, AppError> {
        Ok(score_document(document, job_description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_skills_in_vocabulary_order() {
        let skills = detect_skills("I write SQL daily, some python, and lead with strong Communication");
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Python", "SQL", "Communication"]);
        assert_eq!(skills[2].category, "Soft Skills");
        assert!(skills.iter().all(|s| s.id.is_empty()));
    }

    #[test]
    fn test_detect_multi_word_skill() {
        let skills = detect_skills("Ten years of project management and customer service");
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Project Management", "Customer Service"]);
    }

    #[test]
    fn test_repeated_mentions_raise_level() {
        let skills = detect_skills("react react react");
        assert_eq!(skills[0].level, SkillLevel::Expert);
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(category_for("Node.js"), "Technical");
        assert_eq!(category_for("sales"), "Business");
        assert_eq!(category_for("Leadership"), "Soft Skills");
        assert_eq!(category_for("Rust"), "Other");
    }

    #[test]
    fn test_baseline_score_rubric() {
        let mut doc = ResumeDocument::default();
        assert_eq!(baseline_score(&doc), 60);

        doc.summary = "x".repeat(51);
        assert_eq!(baseline_score(&doc), 70);

        doc.skills = vec![SkillEntry::default(); 4];
        assert_eq!(baseline_score(&doc), 80);

        doc.experience = vec![ExperienceEntry::default()];
        assert_eq!(baseline_score(&doc), 95);
    }

    #[test]
    fn test_summary_of_exactly_fifty_chars_earns_nothing() {
        let doc = ResumeDocument {
            summary: "y".repeat(50),
            ..Default::default()
        };
        assert_eq!(baseline_score(&doc), 60);
    }

    #[test]
    fn test_job_keywords_and_coverage() {
        let mut doc = ResumeDocument::default();
        doc.summary = "Python developer".to_string();
        let record = score_document(&doc, Some("Looking for Python and SQL with leadership"));
        assert_eq!(record.keywords, vec!["python", "sql", "leadership"]);
        assert!(record.suggestions[0].contains("sql"));
        // baseline 60 * 0.6 + (1/3 * 100) * 0.4 = 36 + 13.3
        assert_eq!(record.score, 49);
    }

    #[tokio::test]
    async fn test_generate_without_job_title() {
        let patch = HeuristicAssistant
            .generate(&GenerationRequest {
                description: "Marketing and sales lead".to_string(),
                job_title: None,
            })
            .await
            .unwrap();
        let experience = patch.experience.unwrap();
        assert_eq!(experience[0].position, "Professional");
        assert!(patch
            .summary
            .unwrap()
            .starts_with("Experienced professional with expertise in Marketing, Sales."));
        assert!(patch.projects.is_none());
    }
}
