//! Layout resolver: combines a résumé document with a template descriptor.
//!
//! `resolve_layout` is a pure function: the same (document, descriptor) pair
//! always yields the same `ResolvedLayout`. All colors come from the
//! descriptor; the document never carries styling.
//!
//! # Section rules
//! - Order: summary, experience, projects, education, skills.
//! - A section is emitted only when its data is non-empty.
//! - Skills are grouped by category in first-appearance order.

use serde::Serialize;

use crate::models::{
    EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, ResumeDocument, SkillEntry,
};
use crate::templates::registry::{ImagePosition, Rgb, TemplateDescriptor};

pub const NAME_PLACEHOLDER: &str = "Your Name";
pub const PRESENT_LABEL: &str = "Present";
pub const PROJECT_LINK_LABEL: &str = "View Project";

// ────────────────────────────────────────────────────────────────────────────
// Resolved layout types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLayout {
    pub template_id: &'static str,
    pub header: HeaderBlock,
    /// Sidebar column holding the profile image (aside templates only).
    pub aside: Option<ImageSlot>,
    pub sections: Vec<Section>,
}

/// How the header row arranges the image relative to the name/contact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderArrangement {
    TextOnly,
    /// header-left: image, then text.
    ImageThenText,
    /// header-right: text, then image (reversed row).
    TextThenImage,
    /// header-center: stacked and centered.
    Stacked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderBlock {
    pub background: Rgb,
    pub arrangement: HeaderArrangement,
    pub image: Option<ImageSlot>,
    pub name: String,
    pub contacts: Vec<ContactItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    Location,
    Linkedin,
    Website,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactItem {
    pub kind: ContactKind,
    pub label: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    Medium,
    Large,
    XLarge,
}

impl ImageSize {
    /// Edge length of the square image box in CSS pixels.
    pub fn px(self) -> f32 {
        match self {
            ImageSize::Medium => 96.0,
            ImageSize::Large => 128.0,
            ImageSize::XLarge => 160.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSlot {
    pub source: String,
    pub size: ImageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Projects,
    Education,
    Skills,
}

impl SectionKind {
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Professional Experience",
            SectionKind::Projects => "Projects",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: &'static str,
    pub heading_color: Rgb,
    pub border_color: Rgb,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum SectionBody {
    Summary(String),
    Experience(Vec<ExperienceItem>),
    Projects(Vec<ProjectItem>),
    Education(Vec<EducationItem>),
    Skills(Vec<SkillGroup>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceItem {
    pub id: String,
    pub position: String,
    pub company: String,
    pub date_range: String,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    pub link: Option<String>,
    pub date_range: String,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EducationItem {
    pub id: String,
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub graduated: String,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillLine {
    pub id: String,
    pub name: String,
    pub level: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<SkillLine>,
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

pub fn resolve_layout(doc: &ResumeDocument, template: &TemplateDescriptor) -> ResolvedLayout {
    let image = profile_image_slot(&doc.personal_info, template);

    let (header_image, aside) = match image {
        Some(slot) if template.profile_image_position == ImagePosition::Aside => (None, Some(slot)),
        other => (other, None),
    };

    let arrangement = match (&header_image, template.profile_image_position) {
        (None, _) => HeaderArrangement::TextOnly,
        (Some(_), ImagePosition::HeaderLeft) => HeaderArrangement::ImageThenText,
        (Some(_), ImagePosition::HeaderRight) => HeaderArrangement::TextThenImage,
        (Some(_), ImagePosition::HeaderCenter) => HeaderArrangement::Stacked,
        (Some(_), _) => HeaderArrangement::TextOnly,
    };

    let header = HeaderBlock {
        background: template.header_color,
        arrangement,
        image: header_image,
        name: non_empty_or(&doc.personal_info.full_name, NAME_PLACEHOLDER),
        contacts: contact_items(&doc.personal_info),
    };

    ResolvedLayout {
        template_id: template.id,
        header,
        aside,
        sections: resolve_sections(doc, template),
    }
}

/// The image slot, if the template shows images and the document has one.
fn profile_image_slot(info: &PersonalInfo, template: &TemplateDescriptor) -> Option<ImageSlot> {
    if !template.has_profile_image || info.profile_image.trim().is_empty() {
        return None;
    }
    let size = match template.profile_image_position {
        ImagePosition::None => return None,
        ImagePosition::HeaderLeft | ImagePosition::HeaderRight => ImageSize::Medium,
        ImagePosition::HeaderCenter => ImageSize::Large,
        ImagePosition::Aside => ImageSize::XLarge,
    };
    Some(ImageSlot {
        source: info.profile_image.clone(),
        size,
    })
}

fn contact_items(info: &PersonalInfo) -> Vec<ContactItem> {
    let candidates = [
        (ContactKind::Email, &info.email),
        (ContactKind::Phone, &info.phone),
        (ContactKind::Location, &info.location),
        (ContactKind::Linkedin, &info.linkedin),
        (ContactKind::Website, &info.website),
    ];

    candidates
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(kind, value)| {
            let (label, href) = match kind {
                ContactKind::Email => (value.clone(), Some(format!("mailto:{value}"))),
                ContactKind::Phone => (value.clone(), Some(format!("tel:{value}"))),
                ContactKind::Location => (value.clone(), None),
                ContactKind::Linkedin => ("LinkedIn".to_string(), Some(value.clone())),
                ContactKind::Website => ("Website".to_string(), Some(value.clone())),
            };
            ContactItem { kind, label, href }
        })
        .collect()
}

fn resolve_sections(doc: &ResumeDocument, template: &TemplateDescriptor) -> Vec<Section> {
    let bodies = [
        (!doc.summary.trim().is_empty()).then(|| SectionBody::Summary(doc.summary.clone())),
        (!doc.experience.is_empty())
            .then(|| SectionBody::Experience(doc.experience.iter().map(experience_item).collect())),
        (!doc.projects.is_empty())
            .then(|| SectionBody::Projects(doc.projects.iter().map(project_item).collect())),
        (!doc.education.is_empty())
            .then(|| SectionBody::Education(doc.education.iter().map(education_item).collect())),
        (!doc.skills.is_empty()).then(|| SectionBody::Skills(group_skills(&doc.skills))),
    ];

    bodies
        .into_iter()
        .flatten()
        .map(|body| {
            let kind = body.kind();
            Section {
                kind,
                heading: kind.heading(),
                heading_color: template.accent_color,
                border_color: template.border_color,
                body,
            }
        })
        .collect()
}

impl SectionBody {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionBody::Summary(_) => SectionKind::Summary,
            SectionBody::Experience(_) => SectionKind::Experience,
            SectionBody::Projects(_) => SectionKind::Projects,
            SectionBody::Education(_) => SectionKind::Education,
            SectionBody::Skills(_) => SectionKind::Skills,
        }
    }
}

fn date_range(start: &str, end: &str, current: bool) -> String {
    // `end` is ignored while the entry is current.
    let end = if current { PRESENT_LABEL } else { end };
    format!("{start} - {end}")
}

fn experience_item(e: &ExperienceEntry) -> ExperienceItem {
    ExperienceItem {
        id: e.id.clone(),
        position: e.position.clone(),
        company: e.company.clone(),
        date_range: date_range(&e.start_date, &e.end_date, e.current),
        description: e.description.clone(),
        achievements: e.achievements.clone(),
    }
}

fn project_item(p: &ProjectEntry) -> ProjectItem {
    ProjectItem {
        id: p.id.clone(),
        name: p.name.clone(),
        link: p.link.clone().filter(|l| !l.trim().is_empty()),
        date_range: date_range(&p.start_date, &p.end_date, p.current),
        description: p.description.clone(),
        technologies: p.technologies.clone(),
    }
}

fn education_item(e: &EducationEntry) -> EducationItem {
    EducationItem {
        id: e.id.clone(),
        degree: e.degree.clone(),
        field: e.field.clone(),
        institution: e.institution.clone(),
        graduated: format!("Graduated: {}", e.graduation_date),
        gpa: e
            .gpa
            .as_deref()
            .filter(|g| !g.trim().is_empty())
            .map(|g| format!("GPA: {g}")),
    }
}

/// Groups skills by category; group order is the order of first appearance.
fn group_skills(skills: &[SkillEntry]) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();
    for skill in skills {
        let line = SkillLine {
            id: skill.id.clone(),
            name: skill.name.clone(),
            level: skill.level.as_str(),
        };
        match groups.iter_mut().find(|g| g.category == skill.category) {
            Some(group) => group.skills.push(line),
            None => groups.push(SkillGroup {
                category: skill.category.clone(),
                skills: vec![line],
            }),
        }
    }
    groups
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
