//! Skill matching, gap scoring and course recommendation

pub mod analyzer;
pub mod course_recommender;
pub mod gap_scorer;
pub mod matcher;
pub mod normalizer;
pub mod skills;
pub mod text_processor;

pub use analyzer::{skills_to_improve, GapEngine, RoleOutcome};
