//! Document store: owns the canonical snapshot, applies actions through the
//! pure reducer, and persists after every mutation.
//!
//! Dispatch holds the snapshot lock across reduce and persist, so persisted
//! writes land in the same order the mutations were applied.

pub mod actions;
pub mod handlers;
pub mod persistence;
pub mod validation;

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::models::{AppSnapshot, EducationEntry, ExperienceEntry, ProjectEntry, SkillEntry};
use actions::{reduce, PersonalInfoPatch, ResumeAction};
use persistence::{load_snapshot, save_snapshot, SnapshotStore};
use validation::{prepare_collection, ValidationError};

pub use actions::ResumePatch;

pub struct DocumentStore {
    state: Mutex<Arc<AppSnapshot>>,
    persistence: Arc<dyn SnapshotStore>,
}

impl DocumentStore {
    /// Restores the persisted snapshot, or starts from defaults.
    pub fn open(persistence: Arc<dyn SnapshotStore>) -> Self {
        let mut snapshot = load_snapshot(persistence.as_ref());
        // No generation survives a restart.
        snapshot.is_generating = false;
        Self {
            state: Mutex::new(Arc::new(snapshot)),
            persistence,
        }
    }

    /// The current immutable snapshot. Later mutations never alter it.
    pub fn snapshot(&self) -> Arc<AppSnapshot> {
        self.lock().clone()
    }

    /// Applies `action` atomically and persists the result.
    pub fn dispatch(&self, action: ResumeAction) -> Arc<AppSnapshot> {
        let mut guard = self.lock();
        self.commit(&mut guard, action)
    }

    /// Raises `is_generating` unless it is already up. `None` means another
    /// generation holds the flag.
    pub fn try_begin_generation(&self) -> Option<Arc<AppSnapshot>> {
        let mut guard = self.lock();
        if guard.is_generating {
            return None;
        }
        Some(self.commit(&mut guard, ResumeAction::SetGenerating(true)))
    }

    fn commit(&self, current: &mut Arc<AppSnapshot>, action: ResumeAction) -> Arc<AppSnapshot> {
        let name = action.name();
        let next = Arc::new(reduce(current, action));

        if let Err(e) = save_snapshot(self.persistence.as_ref(), &next) {
            warn!(action = name, "Failed to persist snapshot: {e}");
        }

        *current = next.clone();
        debug!(action = name, "Dispatched");
        next
    }

    fn lock(&self) -> MutexGuard<'_, Arc<AppSnapshot>> {
        // The guarded value is only ever swapped whole, so a poisoned lock still holds a valid snapshot.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    // ── Validated entry points ─────────────────────────────────────────────

    pub fn replace_experience(
        &self,
        entries: Vec<ExperienceEntry>,
    ) -> Result<Arc<AppSnapshot>, ValidationError> {
        let entries = prepare_collection(entries)?;
        Ok(self.dispatch(ResumeAction::ReplaceExperience(entries)))
    }

    pub fn replace_education(
        &self,
        entries: Vec<EducationEntry>,
    ) -> Result<Arc<AppSnapshot>, ValidationError> {
        let entries = prepare_collection(entries)?;
        Ok(self.dispatch(ResumeAction::ReplaceEducation(entries)))
    }

    pub fn replace_skills(&self, entries: Vec<SkillEntry>) -> Result<Arc<AppSnapshot>, ValidationError> {
        let entries = prepare_collection(entries)?;
        Ok(self.dispatch(ResumeAction::ReplaceSkills(entries)))
    }

    pub fn replace_projects(
        &self,
        entries: Vec<ProjectEntry>,
    ) -> Result<Arc<AppSnapshot>, ValidationError> {
        let entries = prepare_collection(entries)?;
        Ok(self.dispatch(ResumeAction::ReplaceProjects(entries)))
    }

    /// Applies a generated patch after assigning ids to any new entries.
    pub fn apply_generated_patch(&self, patch: ResumePatch) -> Result<Arc<AppSnapshot>, ValidationError> {
        let patch = ResumePatch {
            summary: patch.summary,
            skills: patch.skills.map(prepare_collection).transpose()?,
            experience: patch.experience.map(prepare_collection).transpose()?,
            education: patch.education.map(prepare_collection).transpose()?,
            projects: patch.projects.map(prepare_collection).transpose()?,
        };
        Ok(self.dispatch(ResumeAction::ApplyGeneratedPatch(patch)))
    }

    pub fn upload_profile_image(
        &self,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<Arc<AppSnapshot>, ValidationError> {
        let uri = validation::profile_image_from_upload(content_type, bytes)?;
        Ok(self.dispatch(ResumeAction::UpdatePersonalInfo(
            PersonalInfoPatch::profile_image(uri),
        )))
    }

    pub fn set_profile_image_url(&self, url: &str) -> Result<Arc<AppSnapshot>, ValidationError> {
        let url = validation::profile_image_from_url(url)?;
        Ok(self.dispatch(ResumeAction::UpdatePersonalInfo(
            PersonalInfoPatch::profile_image(url),
        )))
    }

    pub fn remove_profile_image(&self) -> Arc<AppSnapshot> {
        self.dispatch(ResumeAction::UpdatePersonalInfo(
            PersonalInfoPatch::profile_image(String::new()),
        ))
    }
}
