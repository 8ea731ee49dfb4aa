//! Report envelope combining role outcomes and course recommendations

use crate::config::EvaluationMode;
use crate::processing::analyzer::RoleOutcome;
use crate::processing::course_recommender::CourseRecommendation;
use crate::processing::gap_scorer::RoleGapReport;
use crate::processing::skills::{PossessedSkills, Subject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything one CLI run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysisReport {
    pub summary: ReportSummary,
    /// Absent for recommendation-only runs
    pub subject: Option<SubjectSummary>,
    pub outcomes: Vec<RoleOutcome>,
    /// Input of the course recommender
    pub skills_to_improve: Vec<String>,
    pub recommendations: Vec<CourseRecommendation>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    pub skill_count: usize,
    pub leveled: bool,
}

impl From<&Subject> for SubjectSummary {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id.clone(),
            name: subject.name.clone(),
            skill_count: subject.skills.len(),
            leveled: matches!(subject.skills, PossessedSkills::Levels(_)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub roles_requested: usize,
    pub roles_evaluated: usize,
    pub roles_not_found: usize,
    pub best_match: Option<BestMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMatch {
    pub role_id: String,
    pub role_title: String,
    pub match_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub mode: Option<EvaluationMode>,
    pub processing_time_ms: u64,
    pub classifier_model: Option<String>,
    pub subject_file: Option<String>,
    pub catalog_file: Option<String>,
}

impl ReportMetadata {
    fn new(mode: Option<EvaluationMode>, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            mode,
            processing_time_ms,
            classifier_model: None,
            subject_file: None,
            catalog_file: None,
        }
    }
}

impl GapAnalysisReport {
    pub fn new(
        subject: &Subject,
        mode: EvaluationMode,
        outcomes: Vec<RoleOutcome>,
        skills_to_improve: Vec<String>,
        recommendations: Vec<CourseRecommendation>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            summary: Self::summarize(&outcomes),
            subject: Some(SubjectSummary::from(subject)),
            outcomes,
            skills_to_improve,
            recommendations,
            metadata: ReportMetadata::new(Some(mode), processing_time_ms),
        }
    }

    /// Report for a plain course search without any role evaluation
    pub fn recommendations_only(
        skills: Vec<String>,
        recommendations: Vec<CourseRecommendation>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            summary: Self::summarize(&[]),
            subject: None,
            outcomes: Vec::new(),
            skills_to_improve: skills,
            recommendations,
            metadata: ReportMetadata::new(None, processing_time_ms),
        }
    }

    pub fn with_sources(mut self, subject_file: impl Into<String>, catalog_file: impl Into<String>) -> Self {
        self.metadata.subject_file = Some(subject_file.into());
        self.metadata.catalog_file = Some(catalog_file.into());
        self
    }

    pub fn with_classifier_model(mut self, model: impl Into<String>) -> Self {
        self.metadata.classifier_model = Some(model.into());
        self
    }

    fn summarize(outcomes: &[RoleOutcome]) -> ReportSummary {
        let reports: Vec<_> = outcomes.iter().filter_map(RoleOutcome::report).collect();

        // Earliest role wins ties
        let mut best: Option<&RoleGapReport> = None;
        for report in reports.iter().copied() {
            if best.map_or(true, |b| report.match_score > b.match_score) {
                best = Some(report);
            }
        }
        let best_match = best.map(|r| BestMatch {
            role_id: r.role_id.clone(),
            role_title: r.role_title.clone(),
            match_score: r.match_score,
        });

        ReportSummary {
            roles_requested: outcomes.len(),
            roles_evaluated: reports.len(),
            roles_not_found: outcomes.len() - reports.len(),
            best_match,
        }
    }
}
