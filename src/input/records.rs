//! Loose on-disk record shapes and their conversion into engine types
//!
//! Role catalogs, subjects and course corpora come from several producers,
//! each with its own field names. Everything is validated and converted here
//! so the engine only ever sees typed values.

use crate::processing::course_recommender::{Course, SkillTranslations};
use crate::processing::skills::{
    Level, PossessedSkills, RoleSkillProfile, SkillRequirement, Subject, BARE_NAME_LEVEL, MAX_LEVEL,
};
use log::warn;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Map entries in document order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedEntries<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// A number, or a number written as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        };
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }

    pub fn to_level(&self) -> Option<Level> {
        self.as_f64()
            .map(|v| v.round().min(f64::from(MAX_LEVEL)) as Level)
    }

    pub fn to_ects(&self) -> Option<u32> {
        self.as_f64().map(|v| v.round() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSkillObject {
    #[serde(alias = "name", alias = "skill_name")]
    pub skill: String,
    #[serde(default, alias = "required_level")]
    pub level: Option<RawNumber>,
    #[serde(default, alias = "rationale")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSkillItem {
    Name(String),
    Detailed(RawSkillObject),
}

impl RawSkillItem {
    fn into_requirement(self) -> Option<SkillRequirement> {
        let (name, level, reason) = match self {
            RawSkillItem::Name(name) => (name, None, None),
            RawSkillItem::Detailed(obj) => (obj.skill, obj.level, obj.reason),
        };

        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut requirement = match level.as_ref().and_then(RawNumber::to_level) {
            Some(level) => SkillRequirement::leveled(name, level),
            None => SkillRequirement::named(name),
        };
        if let Some(reason) = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()) {
            requirement = requirement.with_rationale(reason);
        }
        Some(requirement)
    }
}

/// Every shape a role's required-skill list has been stored in
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRequiredSkills {
    /// One skill per line
    Text(String),
    List(Vec<RawSkillItem>),
    /// Taxonomy URI -> skill name (or skill object)
    UriMap(OrderedEntries<RawSkillItem>),
}

impl Default for RawRequiredSkills {
    fn default() -> Self {
        RawRequiredSkills::List(Vec::new())
    }
}

impl RawRequiredSkills {
    pub fn into_requirements(self) -> Vec<SkillRequirement> {
        match self {
            RawRequiredSkills::Text(text) => text
                .lines()
                .filter_map(|line| RawSkillItem::Name(line.to_string()).into_requirement())
                .collect(),
            RawRequiredSkills::List(items) => items.into_iter().filter_map(RawSkillItem::into_requirement).collect(),
            RawRequiredSkills::UriMap(OrderedEntries(entries)) => entries
                .into_iter()
                .filter_map(|(_, item)| item.into_requirement())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRole {
    #[serde(alias = "role_id", alias = "code")]
    pub id: String,
    #[serde(default, alias = "role_title", alias = "label")]
    pub title: Option<String>,
    #[serde(default, alias = "skills", alias = "required_skills")]
    pub essential_skills: RawRequiredSkills,
}

impl RawRole {
    pub fn into_profile(self) -> RoleSkillProfile {
        let id = self.id.trim().to_string();
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| id.clone());

        RoleSkillProfile {
            role_id: id,
            role_title: title,
            essential_skills: self.essential_skills.into_requirements(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCatalog {
    Wrapped { roles: Vec<RawRole> },
    Bare(Vec<RawRole>),
}

impl RawCatalog {
    pub fn into_profiles(self) -> Vec<RoleSkillProfile> {
        let roles = match self {
            RawCatalog::Wrapped { roles } => roles,
            RawCatalog::Bare(roles) => roles,
        };
        roles.into_iter().map(RawRole::into_profile).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPossessed {
    Names(Vec<String>),
    Levels(BTreeMap<String, RawNumber>),
    /// One skill per line
    Text(String),
}

impl RawPossessed {
    pub fn into_possessed(self) -> PossessedSkills {
        match self {
            RawPossessed::Names(names) => PossessedSkills::Names(
                names
                    .into_iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect(),
            ),
            RawPossessed::Levels(levels) => PossessedSkills::Levels(
                levels
                    .into_iter()
                    .filter_map(|(name, level)| {
                        let name = name.trim().to_string();
                        if name.is_empty() {
                            return None;
                        }
                        // A held skill stays held even when its level is unreadable
                        let level = level.to_level().unwrap_or_else(|| {
                            warn!("Unreadable level {:?} for skill '{}', assuming {}", level, name, BARE_NAME_LEVEL);
                            BARE_NAME_LEVEL
                        });
                        Some((name, level))
                    })
                    .collect(),
            ),
            RawPossessed::Text(text) => PossessedSkills::Names(
                text.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

/// A person, or a team when `members` is non-empty
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSubject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skills: Option<RawPossessed>,
    #[serde(default)]
    pub members: Vec<RawSubject>,
}

impl RawSubject {
    pub fn into_subject(self, fallback_id: &str) -> Subject {
        let id = self
            .id
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| fallback_id.to_string());
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.clone());

        if self.members.is_empty() {
            let skills = self.skills.map(RawPossessed::into_possessed).unwrap_or_default();
            return Subject::new(id, name, skills);
        }

        let mut members: Vec<Subject> = self
            .members
            .into_iter()
            .enumerate()
            .map(|(idx, member)| member.into_subject(&format!("{}-member-{}", id, idx + 1)))
            .collect();
        // Skills listed on the team itself count as one more member
        if let Some(own) = self.skills {
            members.push(Subject::new(id.clone(), name.clone(), own.into_possessed()));
        }
        Subject::team(id, name, &members)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCourse {
    #[serde(alias = "title_de")]
    pub title: String,
    #[serde(default)]
    pub ects: Option<RawNumber>,
    #[serde(default, alias = "learning_outcomes_de")]
    pub description: Option<String>,
    #[serde(default, alias = "skills", alias = "esco_skills_match")]
    pub skills_covered: Vec<String>,
    #[serde(default, alias = "roles")]
    pub role_ids: Vec<String>,
}

impl RawCourse {
    pub fn into_course(self) -> Option<Course> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return None;
        }
        Some(Course {
            title,
            ects: self.ects.as_ref().and_then(RawNumber::to_ects),
            description: self.description.unwrap_or_default(),
            skills_covered: self.skills_covered,
            role_ids: self.role_ids,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCorpus {
    Wrapped { courses: Vec<RawCourse> },
    Bare(Vec<RawCourse>),
}

impl RawCorpus {
    pub fn into_courses(self) -> Vec<Course> {
        let courses = match self {
            RawCorpus::Wrapped { courses } => courses,
            RawCorpus::Bare(courses) => courses,
        };
        courses.into_iter().filter_map(RawCourse::into_course).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTranslation {
    #[serde(alias = "source")]
    pub skill: String,
    #[serde(alias = "target", alias = "de")]
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTranslations {
    Map(BTreeMap<String, String>),
    List(Vec<RawTranslation>),
}

impl RawTranslations {
    pub fn into_translations(self) -> SkillTranslations {
        let pairs: Vec<(String, String)> = match self {
            RawTranslations::Map(map) => map.into_iter().collect(),
            RawTranslations::List(list) => list.into_iter().map(|t| (t.skill, t.translation)).collect(),
        };
        pairs
            .into_iter()
            .filter(|(skill, translation)| !skill.trim().is_empty() && !translation.trim().is_empty())
            .collect()
    }
}
