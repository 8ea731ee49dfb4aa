//! Skill, role and subject structures shared by every engine component

use crate::processing::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Proficiency level on the 1-9 scale; 0 means "not possessed"
pub type Level = u8;

/// Highest level on the proficiency scale
pub const MAX_LEVEL: Level = 9;
/// Level credited for a skill that is held but carries no usable level
pub const BARE_NAME_LEVEL: Level = 1;

/// Normalized skill name -> observed level
pub type LevelMap = HashMap<String, Level>;

/// One skill a role asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    /// `None` for unscored requirements (lexical-only role definitions)
    pub required_level: Option<Level>,
    pub rationale: Option<String>,
}

impl SkillRequirement {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required_level: None,
            rationale: None,
        }
    }

    pub fn leveled(name: impl Into<String>, level: Level) -> Self {
        Self {
            name: name.into(),
            required_level: Some(level.min(MAX_LEVEL)),
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn key(&self) -> String {
        normalize(&self.name)
    }
}

/// Required-skill snapshot of one occupational role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSkillProfile {
    pub role_id: String,
    pub role_title: String,
    pub essential_skills: Vec<SkillRequirement>,
}

impl RoleSkillProfile {
    pub fn new(role_id: impl Into<String>, role_title: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
            role_title: role_title.into(),
            essential_skills: Vec::new(),
        }
    }

    pub fn with_skill(mut self, requirement: SkillRequirement) -> Self {
        self.essential_skills.push(requirement);
        self
    }

    /// Required skill names in role-definition order, duplicates kept
    pub fn skill_names(&self) -> Vec<String> {
        self.essential_skills.iter().map(|s| s.name.clone()).collect()
    }
}

/// What the subject brings, in either of the two supported shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PossessedSkills {
    /// Bare names (lexical mode)
    Names(Vec<String>),
    /// Name -> proficiency level (leveled mode)
    Levels(BTreeMap<String, Level>),
}

impl Default for PossessedSkills {
    fn default() -> Self {
        PossessedSkills::Names(Vec::new())
    }
}

impl PossessedSkills {
    /// Normalized names of every possessed skill
    pub fn name_set(&self) -> HashSet<String> {
        match self {
            PossessedSkills::Names(names) => names.iter().map(|n| normalize(n)).collect(),
            PossessedSkills::Levels(levels) => levels
                .iter()
                .filter(|(_, level)| **level > 0)
                .map(|(name, _)| normalize(name))
                .collect(),
        }
    }

    /// Normalized names with their levels; bare names count as level 1
    pub fn level_map(&self) -> LevelMap {
        let mut map = LevelMap::new();
        match self {
            PossessedSkills::Names(names) => {
                for name in names {
                    map.entry(normalize(name)).or_insert(BARE_NAME_LEVEL);
                }
            }
            PossessedSkills::Levels(levels) => {
                for (name, level) in levels {
                    let entry = map.entry(normalize(name)).or_insert(0);
                    *entry = (*entry).max((*level).min(MAX_LEVEL));
                }
            }
        }
        map
    }

    pub fn len(&self) -> usize {
        match self {
            PossessedSkills::Names(names) => names.len(),
            PossessedSkills::Levels(levels) => levels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The person or aggregated team being evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub skills: PossessedSkills,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, skills: PossessedSkills) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skills,
        }
    }

    /// Merge members into one team subject.
    ///
    /// Names-only teams stay names-only (union, first-seen order). As soon as one
    /// member carries levels the team becomes leveled, keeping the highest level
    /// per skill and counting bare names as level 1.
    pub fn team(id: impl Into<String>, name: impl Into<String>, members: &[Subject]) -> Self {
        let all_names = members
            .iter()
            .all(|m| matches!(m.skills, PossessedSkills::Names(_)));

        let skills = if all_names {
            let mut seen = HashSet::new();
            let mut union = Vec::new();
            for member in members {
                if let PossessedSkills::Names(names) = &member.skills {
                    for name in names {
                        if seen.insert(normalize(name)) {
                            union.push(name.trim().to_string());
                        }
                    }
                }
            }
            PossessedSkills::Names(union)
        } else {
            let mut levels: BTreeMap<String, Level> = BTreeMap::new();
            for member in members {
                for (key, level) in member.skills.level_map() {
                    let entry = levels.entry(key).or_insert(0);
                    *entry = (*entry).max(level);
                }
            }
            PossessedSkills::Levels(levels)
        };

        Self {
            id: id.into(),
            name: name.into(),
            skills,
        }
    }
}

/// Per-skill outcome classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapStatus {
    Missing,
    Gap,
    Match,
    Overskilled,
}

impl GapStatus {
    /// Decision table: absence wins over the gap sign, even for a required level of 0
    pub fn classify(required_level: Level, subject_level: Level) -> Self {
        if subject_level == 0 {
            return GapStatus::Missing;
        }
        match i32::from(required_level) - i32::from(subject_level) {
            g if g > 0 => GapStatus::Gap,
            0 => GapStatus::Match,
            _ => GapStatus::Overskilled,
        }
    }

    /// Whether this status counts towards the match score
    pub fn is_satisfied(&self) -> bool {
        matches!(self, GapStatus::Match | GapStatus::Overskilled)
    }
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GapStatus::Missing => "MISSING",
            GapStatus::Gap => "GAP",
            GapStatus::Match => "MATCH",
            GapStatus::Overskilled => "OVERSKILLED",
        };
        write!(f, "{}", label)
    }
}
