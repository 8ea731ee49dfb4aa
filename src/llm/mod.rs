//! Semantic classifier integration

pub mod classifier;
pub mod estimator;
pub mod prompts;

pub use classifier::{ClassifierError, GeminiClassifier, SkillClassifier};
pub use estimator::{EstimatorSettings, SemanticLevelEstimator};
