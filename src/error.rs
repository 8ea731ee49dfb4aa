//! Error handling for the skill-gap engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillGapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Evaluation cancelled")]
    Cancelled,

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, SkillGapError>;

/// Convert reqwest errors to our custom error type
impl From<reqwest::Error> for SkillGapError {
    fn from(err: reqwest::Error) -> Self {
        SkillGapError::Network(err.to_string())
    }
}

/// Convert TOML decoding errors to our custom error type
impl From<toml::de::Error> for SkillGapError {
    fn from(err: toml::de::Error) -> Self {
        SkillGapError::Configuration(format!("Failed to parse config: {}", err))
    }
}
