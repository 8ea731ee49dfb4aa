//! Gap engine coordinating matching, estimation, scoring and course recommendation

use crate::config::{Config, EvaluationMode};
use crate::error::{Result, SkillGapError};
use crate::input::catalog::RoleResolver;
use crate::llm::estimator::SemanticLevelEstimator;
use crate::processing::course_recommender::{Course, CourseRecommendation, CourseRecommender, SkillTranslations};
use crate::processing::gap_scorer::{GapScorer, RoleGapReport};
use crate::processing::matcher::LexicalMatcher;
use crate::processing::normalizer::normalize;
use crate::processing::skills::{RoleSkillProfile, Subject};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Result for one requested role identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoleOutcome {
    Evaluated(RoleGapReport),
    NotFound { role_id: String, reason: String },
}

impl RoleOutcome {
    pub fn report(&self) -> Option<&RoleGapReport> {
        match self {
            RoleOutcome::Evaluated(report) => Some(report),
            RoleOutcome::NotFound { .. } => None,
        }
    }

    pub fn role_id(&self) -> &str {
        match self {
            RoleOutcome::Evaluated(report) => &report.role_id,
            RoleOutcome::NotFound { role_id, .. } => role_id,
        }
    }
}

/// Entry point for evaluating a subject against target roles
pub struct GapEngine {
    scorer: GapScorer,
    recommender: CourseRecommender,
    estimator: Option<SemanticLevelEstimator>,
    role_delay: Duration,
    max_target_roles: usize,
}

impl GapEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            scorer: GapScorer::new(),
            recommender: CourseRecommender::new(&config.matching),
            estimator: None,
            role_delay: Duration::from_millis(config.classifier.role_delay_ms),
            max_target_roles: config.evaluation.max_target_roles,
        }
    }

    /// Attach the estimator used by [`semantic_gap`](Self::semantic_gap)
    pub fn with_estimator(mut self, estimator: SemanticLevelEstimator) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Reject empty or oversized role requests before any work starts
    pub fn validate_targets(&self, role_ids: &[String]) -> Result<()> {
        if role_ids.is_empty() {
            return Err(SkillGapError::InvalidInput("at least one target role is required".to_string()));
        }
        if role_ids.len() > self.max_target_roles {
            return Err(SkillGapError::InvalidInput(format!(
                "{} target roles requested, at most {} allowed",
                role_ids.len(),
                self.max_target_roles
            )));
        }
        Ok(())
    }

    /// Exact-name comparison of the subject's skill names against each role
    pub fn lexical_gap(&self, subject: &Subject, role_ids: &[String], resolver: &dyn RoleResolver) -> Vec<RoleOutcome> {
        let matcher = LexicalMatcher::from_keys(subject.skills.name_set());
        info!(
            "Lexical gap for {} ({} skills) against {} roles",
            subject.id,
            matcher.skill_count(),
            role_ids.len()
        );

        role_ids
            .iter()
            .map(|role_id| match resolve(resolver, role_id) {
                Ok(role) => {
                    let outcome = matcher.match_required(&role.skill_names());
                    RoleOutcome::Evaluated(self.scorer.score_lexical(&role, &outcome))
                }
                Err(not_found) => not_found,
            })
            .collect()
    }

    /// Level comparison using the subject's own declared levels
    pub fn leveled_gap(&self, subject: &Subject, role_ids: &[String], resolver: &dyn RoleResolver) -> Vec<RoleOutcome> {
        let levels = subject.skills.level_map();
        info!("Leveled gap for {} against {} roles", subject.id, role_ids.len());

        role_ids
            .iter()
            .map(|role_id| match resolve(resolver, role_id) {
                Ok(role) => RoleOutcome::Evaluated(self.scorer.score(&role, &levels, EvaluationMode::Leveled)),
                Err(not_found) => not_found,
            })
            .collect()
    }

    /// Level comparison with levels estimated by the semantic classifier.
    ///
    /// Roles are evaluated one after another with a courtesy delay between
    /// classifier calls. Cancelling `cancel` aborts the whole batch.
    pub async fn semantic_gap(
        &self,
        subject: &Subject,
        role_ids: &[String],
        resolver: &dyn RoleResolver,
        cancel: &CancellationToken,
    ) -> Result<Vec<RoleOutcome>> {
        let estimator = self.estimator.as_ref().ok_or_else(|| {
            SkillGapError::Configuration("semantic evaluation needs a classifier".to_string())
        })?;

        let possessed = subject.skills.level_map();
        info!("Semantic gap for {} against {} roles", subject.id, role_ids.len());

        let mut outcomes = Vec::with_capacity(role_ids.len());
        let mut called = false;

        for role_id in role_ids {
            let role = match resolve(resolver, role_id) {
                Ok(role) => role,
                Err(not_found) => {
                    outcomes.push(not_found);
                    continue;
                }
            };

            // Roles without requirements never reach the classifier
            let calls_classifier = !role.essential_skills.is_empty();
            if called && calls_classifier && !self.role_delay.is_zero() {
                debug!("Waiting {:?} before the next classifier call", self.role_delay);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SkillGapError::Cancelled),
                    _ = tokio::time::sleep(self.role_delay) => {}
                }
            }

            let levels = estimator
                .estimate_levels_with_cancel(&possessed, &role.essential_skills, cancel)
                .await?;
            called |= calls_classifier;

            let report = self.scorer.score(&role, &levels, EvaluationMode::Semantic);
            debug!("Role {} scored {}%", report.role_id, report.match_score);
            outcomes.push(RoleOutcome::Evaluated(report));
        }

        Ok(outcomes)
    }

    /// Dispatch to the entry point for `mode`
    pub async fn evaluate(
        &self,
        mode: EvaluationMode,
        subject: &Subject,
        role_ids: &[String],
        resolver: &dyn RoleResolver,
        cancel: &CancellationToken,
    ) -> Result<Vec<RoleOutcome>> {
        match mode {
            EvaluationMode::Lexical => Ok(self.lexical_gap(subject, role_ids, resolver)),
            EvaluationMode::Leveled => Ok(self.leveled_gap(subject, role_ids, resolver)),
            EvaluationMode::Semantic => self.semantic_gap(subject, role_ids, resolver, cancel).await,
        }
    }

    pub fn recommend_courses(
        &self,
        missing_skills: &[String],
        corpus: &[Course],
        translations: &SkillTranslations,
    ) -> Vec<CourseRecommendation> {
        self.recommender.recommend_translated(missing_skills, corpus, translations)
    }
}

fn resolve(resolver: &dyn RoleResolver, role_id: &str) -> std::result::Result<RoleSkillProfile, RoleOutcome> {
    resolver.resolve_role(role_id).map_err(|e| {
        warn!("Skipping role {}: {}", role_id, e);
        RoleOutcome::NotFound {
            role_id: role_id.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Missing skills of every incomplete role, deduplicated in first-seen order
pub fn skills_to_improve(outcomes: &[RoleOutcome]) -> Vec<String> {
    let mut seen = HashSet::new();
    outcomes
        .iter()
        .filter_map(RoleOutcome::report)
        .filter(|report| !report.is_complete())
        .flat_map(|report| report.missing_skills.iter())
        .filter(|skill| seen.insert(normalize(skill)))
        .cloned()
        .collect()
}
