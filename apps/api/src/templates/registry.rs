//! Static template catalogue.
//!
//! Lookup is by id through a lazily built index. An unknown id never fails:
//! it resolves to the first catalogue entry.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPLATE_ID: &str = "modern";

/// 0–255 channel triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS functional notation, e.g. `rgb(29, 78, 216)`.
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Where a template places the profile image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImagePosition {
    None,
    HeaderLeft,
    HeaderRight,
    HeaderCenter,
    Aside,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static [&'static str],
    pub header_color: Rgb,
    pub accent_color: Rgb,
    pub border_color: Rgb,
    pub has_profile_image: bool,
    pub profile_image_position: ImagePosition,
}

static TEMPLATES: [TemplateDescriptor; 8] = [
    TemplateDescriptor {
        id: "modern",
        name: "Modern",
        description: "Clean and contemporary design with subtle colors",
        best_for: &["Tech", "Startups", "Digital Roles"],
        header_color: Rgb(29, 78, 216),
        accent_color: Rgb(29, 78, 216),
        border_color: Rgb(59, 130, 246),
        has_profile_image: true,
        profile_image_position: ImagePosition::HeaderRight,
    },
    TemplateDescriptor {
        id: "classic",
        name: "Classic",
        description: "Traditional and professional layout",
        best_for: &["Finance", "Law", "Government"],
        header_color: Rgb(55, 65, 81),
        accent_color: Rgb(31, 41, 55),
        border_color: Rgb(107, 114, 128),
        has_profile_image: false,
        profile_image_position: ImagePosition::None,
    },
    TemplateDescriptor {
        id: "creative",
        name: "Creative",
        description: "Bold and eye-catching for creative roles",
        best_for: &["Design", "Marketing", "Art"],
        header_color: Rgb(126, 34, 206),
        accent_color: Rgb(147, 51, 234),
        border_color: Rgb(236, 72, 153),
        has_profile_image: true,
        profile_image_position: ImagePosition::HeaderCenter,
    },
    TemplateDescriptor {
        id: "executive",
        name: "Executive",
        description: "Sophisticated layout for leadership roles",
        best_for: &["Management", "C-Level", "Consulting"],
        header_color: Rgb(4, 120, 87),
        accent_color: Rgb(5, 150, 105),
        border_color: Rgb(20, 184, 166),
        has_profile_image: true,
        profile_image_position: ImagePosition::Aside,
    },
    TemplateDescriptor {
        id: "minimal",
        name: "Minimal",
        description: "Ultra-clean with maximum whitespace",
        best_for: &["Academic", "Research", "Writing"],
        header_color: Rgb(75, 85, 99),
        accent_color: Rgb(55, 65, 81),
        border_color: Rgb(209, 213, 219),
        has_profile_image: false,
        profile_image_position: ImagePosition::None,
    },
    TemplateDescriptor {
        id: "bold",
        name: "Bold",
        description: "High-contrast with strong typography",
        best_for: &["Sales", "Entrepreneurs", "Public Speakers"],
        header_color: Rgb(190, 18, 60),
        accent_color: Rgb(225, 29, 72),
        border_color: Rgb(249, 115, 22),
        has_profile_image: true,
        profile_image_position: ImagePosition::HeaderLeft,
    },
    TemplateDescriptor {
        id: "professional",
        name: "Professional",
        description: "Balanced design for all industries",
        best_for: &["Business", "Consulting", "Corporate"],
        header_color: Rgb(51, 65, 85),
        accent_color: Rgb(71, 85, 105),
        border_color: Rgb(100, 116, 139),
        has_profile_image: true,
        profile_image_position: ImagePosition::HeaderRight,
    },
    TemplateDescriptor {
        id: "technical",
        name: "Technical",
        description: "Structured layout for technical professionals",
        best_for: &["Engineering", "IT", "Science"],
        header_color: Rgb(14, 116, 144),
        accent_color: Rgb(8, 145, 178),
        border_color: Rgb(6, 182, 212),
        has_profile_image: true,
        profile_image_position: ImagePosition::Aside,
    },
];

fn index() -> &'static HashMap<&'static str, usize> {
    static INDEX: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        TEMPLATES
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect()
    })
}

/// Full catalogue in display order.
pub fn all() -> &'static [TemplateDescriptor] {
    &TEMPLATES
}

/// Descriptor for `id`, or the first catalogue entry when `id` is unknown.
pub fn lookup(id: &str) -> &'static TemplateDescriptor {
    match index().get(id) {
        Some(&i) => &TEMPLATES[i],
        None => &TEMPLATES[0],
    }
}

/// Templates recommended for an industry, catalogue order preserved.
pub fn templates_for_industry(industry: &str) -> Vec<&'static TemplateDescriptor> {
    TEMPLATES
        .iter()
        .filter(|t| t.best_for.iter().any(|b| b.eq_ignore_ascii_case(industry)))
        .collect()
}

/// Distinct industries across the catalogue, first-seen order.
pub fn industries() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for industry in TEMPLATES.iter().flat_map(|t| t.best_for.iter()) {
        if !seen.contains(industry) {
            seen.push(*industry);
        }
    }
    seen
}
