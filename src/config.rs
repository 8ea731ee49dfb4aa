//! Configuration management for the skill-gap engine

use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub matching: MatchingConfig,
    pub evaluation: EvaluationConfig,
    pub output: OutputConfig,
}

/// Settings for the external semantic classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
    /// Upper bound for a single classifier attempt
    pub timeout_secs: u64,
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Backoff before retry `n` is `backoff_base_ms * n`
    pub backoff_base_ms: u64,
    /// Courtesy pause between roles during a semantic batch
    pub role_delay_ms: u64,
}

/// Tunable thresholds of the course matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Tokens shorter than this are not keywords
    pub min_keyword_len: usize,
    /// Tokens at least this long are "significant"
    pub significant_keyword_len: usize,
    /// Matches required when a phrase has more than one significant token
    pub multi_token_min_matches: usize,
    pub extra_stop_words: Vec<String>,
    #[serde(default)]
    pub max_recommendations: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub default_mode: EvaluationMode,
    pub max_target_roles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

/// How subject skills are compared against role requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Plain string presence
    Lexical,
    /// The subject's own proficiency levels
    Leveled,
    /// Levels estimated by the external classifier
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvaluationMode::Lexical => "lexical",
            EvaluationMode::Leveled => "leveled",
            EvaluationMode::Semantic => "semantic",
        };
        write!(f, "{}", name)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.1,
            timeout_secs: 30,
            max_attempts: 3,
            backoff_base_ms: 2000,
            role_delay_ms: 1500,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_keyword_len: 3,
            significant_keyword_len: 5,
            multi_token_min_matches: 1,
            extra_stop_words: Vec::new(),
            max_recommendations: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            matching: MatchingConfig::default(),
            evaluation: EvaluationConfig {
                default_mode: EvaluationMode::Lexical,
                max_target_roles: 5,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults on first use
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillGapError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-gap")
            .join("config.toml")
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.classifier.max_attempts == 0 {
            return Err(SkillGapError::Configuration(
                "classifier.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(SkillGapError::Configuration(
                "classifier.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.matching.multi_token_min_matches == 0 {
            return Err(SkillGapError::Configuration(
                "matching.multi_token_min_matches must be at least 1".to_string(),
            ));
        }
        if self.evaluation.max_target_roles == 0 {
            return Err(SkillGapError::Configuration(
                "evaluation.max_target_roles must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
