//! The closed set of document operations and the pure reducer that applies them.
//!
//! `reduce` never mutates its input: it derives a fresh snapshot from the
//! previous one. The `match` is exhaustive, so a new action cannot be added
//! without deciding how it reduces.

use serde::{Deserialize, Serialize};

use crate::models::{
    AppSnapshot, AtsScoreRecord, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry,
    SkillEntry,
};
use crate::templates::registry;

/// Shallow-merge payload for `personalInfo`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfoPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub profile_image: Option<String>,
}

impl PersonalInfoPatch {
    pub fn profile_image(image: String) -> Self {
        Self {
            profile_image: Some(image),
            ..Default::default()
        }
    }

    fn merge_into(self, info: &mut PersonalInfo) {
        let fields = [
            (self.full_name, &mut info.full_name),
            (self.email, &mut info.email),
            (self.phone, &mut info.phone),
            (self.location, &mut info.location),
            (self.linkedin, &mut info.linkedin),
            (self.website, &mut info.website),
            (self.profile_image, &mut info.profile_image),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Partial document produced by the generation collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumePatch {
    pub summary: Option<String>,
    pub skills: Option<Vec<SkillEntry>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub projects: Option<Vec<ProjectEntry>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResumeAction {
    UpdatePersonalInfo(PersonalInfoPatch),
    UpdateSummary(String),
    ReplaceExperience(Vec<ExperienceEntry>),
    ReplaceEducation(Vec<EducationEntry>),
    ReplaceSkills(Vec<SkillEntry>),
    ReplaceProjects(Vec<ProjectEntry>),
    SetTemplate(String),
    ApplyGeneratedPatch(ResumePatch),
    SetAtsScore(AtsScoreRecord),
    SetGenerating(bool),
    SetSkillsDescription(String),
    Reset,
}

impl ResumeAction {
    /// Short stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ResumeAction::UpdatePersonalInfo(_) => "update_personal_info",
            ResumeAction::UpdateSummary(_) => "update_summary",
            ResumeAction::ReplaceExperience(_) => "replace_experience",
            ResumeAction::ReplaceEducation(_) => "replace_education",
            ResumeAction::ReplaceSkills(_) => "replace_skills",
            ResumeAction::ReplaceProjects(_) => "replace_projects",
            ResumeAction::SetTemplate(_) => "set_template",
            ResumeAction::ApplyGeneratedPatch(_) => "apply_generated_patch",
            ResumeAction::SetAtsScore(_) => "set_ats_score",
            ResumeAction::SetGenerating(_) => "set_generating",
            ResumeAction::SetSkillsDescription(_) => "set_skills_description",
            ResumeAction::Reset => "reset",
        }
    }
}

/// Derives the next snapshot from `state` and `action`.
pub fn reduce(state: &AppSnapshot, action: ResumeAction) -> AppSnapshot {
    let mut next = state.clone();
    let resume = &mut next.resume;

    match action {
        ResumeAction::UpdatePersonalInfo(patch) => patch.merge_into(&mut resume.personal_info),
        ResumeAction::UpdateSummary(text) => resume.summary = text,
        ResumeAction::ReplaceExperience(list) => resume.experience = normalize_experience(list),
        ResumeAction::ReplaceEducation(list) => resume.education = list,
        ResumeAction::ReplaceSkills(list) => resume.skills = list,
        ResumeAction::ReplaceProjects(list) => resume.projects = normalize_projects(list),
        ResumeAction::SetTemplate(id) => resume.template = registry::lookup(&id).id.to_string(),
        ResumeAction::ApplyGeneratedPatch(patch) => {
            if let Some(summary) = patch.summary {
                resume.summary = summary;
            }
            if let Some(skills) = patch.skills {
                resume.skills = skills;
            }
            if let Some(experience) = patch.experience {
                resume.experience = normalize_experience(experience);
            }
            if let Some(education) = patch.education {
                resume.education = education;
            }
            if let Some(projects) = patch.projects {
                resume.projects = normalize_projects(projects);
            }
        }
        ResumeAction::SetAtsScore(record) => next.ats_score = record.clamped(),
        ResumeAction::SetGenerating(flag) => next.is_generating = flag,
        ResumeAction::SetSkillsDescription(text) => next.skills_description = text,
        ResumeAction::Reset => return AppSnapshot::default(),
    }

    next
}

// A current entry has no authoritative end date; drop it so stale values never persist.
fn normalize_experience(mut list: Vec<ExperienceEntry>) -> Vec<ExperienceEntry> {
    for entry in list.iter_mut().filter(|e| e.current) {
        entry.end_date.clear();
    }
    list
}

fn normalize_projects(mut list: Vec<ProjectEntry>) -> Vec<ProjectEntry> {
    for entry in list.iter_mut().filter(|p| p.current) {
        entry.end_date.clear();
    }
    list
}
