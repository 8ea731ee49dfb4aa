//! Batched proficiency estimation through a [`SkillClassifier`]

use crate::config::ClassifierConfig;
use crate::error::{Result, SkillGapError};
use crate::llm::classifier::{ClassificationRequest, ClassifierError, SkillClassifier};
use crate::processing::normalizer::normalize;
use crate::processing::skills::{Level, LevelMap, SkillRequirement, MAX_LEVEL};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry and timeout settings for one estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorSettings {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Attempt `n` failing transiently waits `backoff_base * n`
    pub backoff_base: Duration,
    pub attempt_timeout: Duration,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

impl From<&ClassifierConfig> for EstimatorSettings {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            attempt_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct SemanticLevelEstimator {
    classifier: Arc<dyn SkillClassifier>,
    settings: EstimatorSettings,
}

impl SemanticLevelEstimator {
    pub fn new(classifier: Arc<dyn SkillClassifier>, settings: EstimatorSettings) -> Self {
        Self { classifier, settings }
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    /// Estimate the subject's level for every required skill.
    ///
    /// Never fails: classifier outages and malformed answers degrade to an
    /// empty map, which downstream scoring reads as "everything missing".
    pub async fn estimate_levels(&self, possessed: &LevelMap, required: &[SkillRequirement]) -> LevelMap {
        self.estimate_levels_with_cancel(possessed, required, &CancellationToken::new())
            .await
            .unwrap_or_default()
    }

    /// Like [`estimate_levels`](Self::estimate_levels), returning
    /// [`SkillGapError::Cancelled`] as soon as `cancel` fires.
    pub async fn estimate_levels_with_cancel(
        &self,
        possessed: &LevelMap,
        required: &[SkillRequirement],
        cancel: &CancellationToken,
    ) -> Result<LevelMap> {
        if required.is_empty() {
            return Ok(LevelMap::new());
        }

        let request = ClassificationRequest {
            possessed: possessed.iter().map(|(k, v)| (k.clone(), *v)).collect::<BTreeMap<_, _>>(),
            required: required.iter().map(|r| r.name.clone()).collect(),
        };

        let max_attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            debug!(
                "Classifier {} attempt {}/{} for {} skills",
                self.classifier.name(),
                attempt,
                max_attempts,
                request.required.len()
            );

            let call = tokio::time::timeout(self.settings.attempt_timeout, self.classifier.classify(&request));
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SkillGapError::Cancelled),
                outcome = call => outcome,
            };

            let failure = match outcome {
                Ok(Ok(text)) => {
                    return Ok(match parse_levels(&text, required) {
                        Ok(levels) => levels,
                        Err(e) => {
                            warn!("Discarding classifier answer: {}", e);
                            LevelMap::new()
                        }
                    });
                }
                Ok(Err(err)) => err,
                Err(_) => ClassifierError::Timeout(self.settings.attempt_timeout.as_millis() as u64),
            };

            if !failure.is_transient() {
                warn!("Classifier failed permanently: {}", failure);
                return Ok(LevelMap::new());
            }

            if attempt == max_attempts {
                warn!("Classifier still failing after {} attempts: {}", max_attempts, failure);
                break;
            }

            let delay = self.settings.backoff_base * attempt;
            info!("Transient classifier failure ({}), retrying in {:?}", failure, delay);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SkillGapError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        Ok(LevelMap::new())
    }
}

/// The substring from the first `[` to the last `]`
pub fn extract_json_array(text: &str) -> Result<&str> {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(SkillGapError::MalformedResponse(
            "no JSON array in classifier answer".to_string(),
        )),
    }
}

/// Parse a classifier answer into levels for `required`.
///
/// Elements without a usable name or level are skipped. Required skills the
/// answer leaves out are reported at level 0; skills the role never asked
/// for are dropped.
pub fn parse_levels(text: &str, required: &[SkillRequirement]) -> Result<LevelMap> {
    let array = extract_json_array(text)?;
    let elements: Vec<Value> = serde_json::from_str(array)
        .map_err(|e| SkillGapError::MalformedResponse(e.to_string()))?;

    let wanted: HashSet<String> = required.iter().map(|r| r.key()).collect();
    let mut levels = LevelMap::new();

    for element in &elements {
        let Some((name, level)) = parse_element(element) else {
            debug!("Skipping invalid classifier element: {}", element);
            continue;
        };
        let key = normalize(&name);
        if wanted.contains(&key) {
            levels.entry(key).or_insert(level);
        }
    }

    for key in wanted {
        levels.entry(key).or_insert(0);
    }
    Ok(levels)
}

fn parse_element(element: &Value) -> Option<(String, Level)> {
    let object = element.as_object()?;
    let name = object
        .get("skill_name")
        .or_else(|| object.get("skill"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())?;
    let level = object
        .get("user_level")
        .or_else(|| object.get("level"))
        .and_then(parse_level)?;
    Some((name.to_string(), level))
}

fn parse_level(value: &Value) -> Option<Level> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    Some(raw.round().min(f64::from(MAX_LEVEL)) as Level)
}
