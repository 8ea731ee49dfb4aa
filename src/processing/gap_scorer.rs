//! Per-skill gap classification and per-role match scores

use crate::config::EvaluationMode;
use crate::processing::matcher::LexicalMatch;
use crate::processing::normalizer::normalize;
use crate::processing::skills::{GapStatus, Level, LevelMap, RoleSkillProfile};
use serde::{Deserialize, Serialize};

/// Outcome for one required skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGapEntry {
    pub skill_name: String,
    /// `None` in lexical mode
    pub required_level: Option<Level>,
    /// `None` in lexical mode
    pub subject_level: Option<Level>,
    /// `required_level - subject_level`, `None` in lexical mode
    pub gap: Option<i32>,
    pub status: GapStatus,
    pub rationale: Option<String>,
}

/// Aggregated result of evaluating one subject against one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGapReport {
    pub role_id: String,
    pub role_title: String,
    pub mode: EvaluationMode,
    /// Integer percentage in [0, 100]
    pub match_score: u8,
    pub total_required: usize,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Possessed below the required level (leveled modes only)
    pub gap_skills: Vec<String>,
    pub entries: Vec<SkillGapEntry>,
}

impl RoleGapReport {
    pub fn is_complete(&self) -> bool {
        self.match_score >= 100
    }
}

/// `floor(100 * matching / total)`, or 0 for an empty requirement list
pub fn match_percentage(matching: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (matching.min(total) * 100) / total;
    pct as u8
}

/// Turns per-skill observations into a [`RoleGapReport`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GapScorer;

impl GapScorer {
    pub fn new() -> Self {
        Self
    }

    /// Leveled scoring: look up each requirement's normalized name in `levels`.
    ///
    /// Absent skills count as level 0 and unscored requirements as level 0.
    pub fn score(&self, role: &RoleSkillProfile, levels: &LevelMap, mode: EvaluationMode) -> RoleGapReport {
        let mut entries = Vec::with_capacity(role.essential_skills.len());
        let mut matching_skills = Vec::new();
        let mut missing_skills = Vec::new();
        let mut gap_skills = Vec::new();

        for requirement in &role.essential_skills {
            let required = requirement.required_level.unwrap_or(0);
            let observed = levels.get(&normalize(&requirement.name)).copied().unwrap_or(0);
            let status = GapStatus::classify(required, observed);

            if status.is_satisfied() {
                matching_skills.push(requirement.name.clone());
            } else if status == GapStatus::Missing {
                missing_skills.push(requirement.name.clone());
            } else {
                gap_skills.push(requirement.name.clone());
            }

            entries.push(SkillGapEntry {
                skill_name: requirement.name.clone(),
                required_level: Some(required),
                subject_level: Some(observed),
                gap: Some(i32::from(required) - i32::from(observed)),
                status,
                rationale: requirement.rationale.clone(),
            });
        }

        let total_required = entries.len();
        RoleGapReport {
            role_id: role.role_id.clone(),
            role_title: role.role_title.clone(),
            mode,
            match_score: match_percentage(matching_skills.len(), total_required),
            total_required,
            matching_skills,
            missing_skills,
            gap_skills,
            entries,
        }
    }

    /// Lexical scoring from a matcher partition of `role`'s skill names
    pub fn score_lexical(&self, role: &RoleSkillProfile, outcome: &LexicalMatch) -> RoleGapReport {
        // Walk the role in order so entries line up with the definition even
        // when the same skill appears more than once.
        let mut matched_remaining: Vec<&String> = outcome.matching.iter().collect();
        let mut entries = Vec::with_capacity(role.essential_skills.len());

        for requirement in &role.essential_skills {
            let position = matched_remaining.iter().position(|m| **m == requirement.name);
            let status = match position {
                Some(idx) => {
                    matched_remaining.remove(idx);
                    GapStatus::Match
                }
                None => GapStatus::Missing,
            };

            entries.push(SkillGapEntry {
                skill_name: requirement.name.clone(),
                required_level: None,
                subject_level: None,
                gap: None,
                status,
                rationale: requirement.rationale.clone(),
            });
        }

        let total_required = entries.len();
        RoleGapReport {
            role_id: role.role_id.clone(),
            role_title: role.role_title.clone(),
            mode: EvaluationMode::Lexical,
            match_score: match_percentage(outcome.matching.len(), total_required),
            total_required,
            matching_skills: outcome.matching.clone(),
            missing_skills: outcome.missing.clone(),
            gap_skills: Vec::new(),
            entries,
        }
    }
}
