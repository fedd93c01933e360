//! Validation at the point of entry.
//!
//! Everything here runs before an action is dispatched. A rejected payload
//! never reaches the reducer, so the document is unchanged on failure.

use std::collections::HashSet;
use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{EducationEntry, ExperienceEntry, ProjectEntry, SkillEntry};

/// Largest accepted profile image upload (2 MiB).
pub const MAX_PROFILE_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select an image file (got '{0}')")]
    NotAnImage(String),

    #[error("Image size should be less than 2MB ({size} bytes, max {max})")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Please enter a valid image URL")]
    InvalidImageUrl,

    #[error("Duplicate {collection} id '{id}'")]
    DuplicateId { collection: &'static str, id: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Profile image
// ────────────────────────────────────────────────────────────────────────────

/// Validates an uploaded image and encodes it as a `data:` URI.
pub fn profile_image_from_upload(content_type: &str, bytes: &[u8]) -> Result<String, ValidationError> {
    let mime = content_type.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") {
        return Err(ValidationError::NotAnImage(content_type.to_string()));
    }
    if bytes.len() > MAX_PROFILE_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            size: bytes.len(),
            max: MAX_PROFILE_IMAGE_BYTES,
        });
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn image_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://\S+\.(jpeg|jpg|gif|png)$").expect("image url pattern is valid")
    })
}

/// Accepts an external image URL ending in a known raster extension.
pub fn profile_image_from_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if image_url_pattern().is_match(url) {
        Ok(url.to_string())
    } else {
        Err(ValidationError::InvalidImageUrl)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collection ids
// ────────────────────────────────────────────────────────────────────────────

/// Something stored in an id-keyed résumé collection.
pub trait Identified {
    const PREFIX: &'static str;
    const COLLECTION: &'static str;
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! identified {
    ($ty:ty, $prefix:literal, $collection:literal) => {
        impl Identified for $ty {
            const PREFIX: &'static str = $prefix;
            const COLLECTION: &'static str = $collection;
            fn id(&self) -> &str {
                &self.id
            }
            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

identified!(ExperienceEntry, "exp", "experience");
identified!(EducationEntry, "edu", "education");
identified!(SkillEntry, "skill", "skills");
identified!(ProjectEntry, "proj", "projects");

/// A fresh id of the form `<prefix>-<uuid v4>`. Never collides with a prior id.
pub fn new_entry_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// Assigns ids to entries that arrive without one, then rejects duplicates.
pub fn prepare_collection<T: Identified>(mut entries: Vec<T>) -> Result<Vec<T>, ValidationError> {
    for entry in entries.iter_mut().filter(|e| e.id().trim().is_empty()) {
        entry.set_id(new_entry_id(T::PREFIX));
    }

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.id()) {
            return Err(ValidationError::DuplicateId {
                collection: T::COLLECTION,
                id: entry.id().to_string(),
            });
        }
    }
    Ok(entries)
}
