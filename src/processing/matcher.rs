//! Exact keyword matching between possessed and required skills

use crate::processing::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable partition of a role's required skills
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalMatch {
    pub matching: Vec<String>,
    pub missing: Vec<String>,
}

impl LexicalMatch {
    pub fn total(&self) -> usize {
        self.matching.len() + self.missing.len()
    }
}

/// Lexical matcher built once per subject and reused across roles
#[derive(Debug, Clone, Default)]
pub struct LexicalMatcher {
    possessed: HashSet<String>,
}

impl LexicalMatcher {
    pub fn new<I, S>(possessed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            possessed: possessed.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    /// Build from an already-normalized set
    pub fn from_keys(possessed: HashSet<String>) -> Self {
        Self { possessed }
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.possessed.contains(&normalize(skill))
    }

    /// Classify each required skill in input order; duplicates are kept
    pub fn match_required<S: AsRef<str>>(&self, required: &[S]) -> LexicalMatch {
        let mut result = LexicalMatch::default();

        for skill in required {
            let skill = skill.as_ref();
            if self.contains(skill) {
                result.matching.push(skill.to_string());
            } else {
                result.missing.push(skill.to_string());
            }
        }

        result
    }

    pub fn skill_count(&self) -> usize {
        self.possessed.len()
    }
}

/// One-shot form of [`LexicalMatcher::match_required`]
pub fn match_skills<P, R>(possessed: &[P], required: &[R]) -> LexicalMatch
where
    P: AsRef<str>,
    R: AsRef<str>,
{
    LexicalMatcher::new(possessed.iter().map(|p| p.as_ref())).match_required(required)
}
