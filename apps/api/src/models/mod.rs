pub mod ats;
pub mod resume;

pub use ats::{clamp_score, AtsScoreRecord};
pub use resume::{
    AppSnapshot, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, ResumeDocument,
    SkillEntry, SkillLevel,
};
