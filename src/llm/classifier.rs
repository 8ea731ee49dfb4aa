//! Semantic classifier boundary and its HTTP implementation

use crate::config::ClassifierConfig;
use crate::error::{Result, SkillGapError};
use crate::llm::prompts::{PromptParams, PromptTemplates};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failures reported by a classifier call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier rate limit hit: {0}")]
    RateLimited(String),

    #[error("classifier attempt timed out after {0}ms")]
    Timeout(u64),

    #[error("classifier rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("classifier transport error: {0}")]
    Transport(String),

    #[error("classifier returned no content")]
    EmptyResponse,
}

impl ClassifierError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClassifierError::Unavailable(_) | ClassifierError::RateLimited(_) | ClassifierError::Timeout(_)
        )
    }
}

/// One batched question: every required skill of a role at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub possessed: BTreeMap<String, u8>,
    pub required: Vec<String>,
}

/// External, non-deterministic skill-level classifier.
///
/// Implementations return the raw response text; parsing happens in the
/// estimator so every backend gets the same defensive extraction.
#[async_trait]
pub trait SkillClassifier: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> std::result::Result<String, ClassifierError>;

    fn name(&self) -> &str;
}

/// Classifier backed by the Gemini `generateContent` REST endpoint
pub struct GeminiClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    prompt_templates: PromptTemplates,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClassifier {
    /// Build from config, reading the API key from `config.api_key_env`
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SkillGapError::Configuration(format!(
                "{} environment variable not set",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &ClassifierConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            prompt_templates: PromptTemplates::default(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn map_status(status: StatusCode, body: String) -> ClassifierError {
        match status.as_u16() {
            429 => ClassifierError::RateLimited(body),
            500 | 502 | 503 | 504 => ClassifierError::Unavailable(format!("{}: {}", status, body)),
            code => ClassifierError::Rejected { status: code, message: body },
        }
    }

    fn map_transport(err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout(0)
        } else if err.is_connect() {
            ClassifierError::Unavailable(err.to_string())
        } else {
            ClassifierError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl SkillClassifier for GeminiClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> std::result::Result<String, ClassifierError> {
        let prompt = self.prompt_templates.render_level_estimation(&PromptParams {
            possessed_skills: request.possessed.clone(),
            required_skills: request.required.clone(),
        });

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json"
            }
        });

        debug!(
            "Sending {} required skills to classifier model {}",
            request.required.len(),
            self.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Classifier API error {}: {}", status, error_text);
            return Err(Self::map_status(status, error_text));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Transport(format!("Failed to decode classifier response: {}", e)))?;

        let text: String = payload
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyResponse);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
