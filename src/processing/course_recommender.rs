//! Keyword-overlap recommendation of learning courses for missing skills

use crate::config::MatchingConfig;
use crate::processing::normalizer::normalize;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A learning offering from the course corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub ects: Option<u32>,
    #[serde(default)]
    pub description: String,
    /// Taxonomy skills the corpus provider already tagged on this course
    #[serde(default)]
    pub skills_covered: Vec<String>,
    /// Roles the course was tagged for
    #[serde(default)]
    pub role_ids: Vec<String>,
}

impl Course {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ects: None,
            description: description.into(),
            skills_covered: Vec::new(),
            role_ids: Vec::new(),
        }
    }

    /// Lowercase text searched for skill phrases and keywords
    fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.title, self.description);
        for tag in &self.skills_covered {
            text.push(' ');
            text.push_str(tag);
        }
        text.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub course: Course,
    /// Missing skills this course covers, in missing-list order
    pub matched_skills: Vec<String>,
    pub matched_keywords: Vec<String>,
    /// Number of distinct keywords matched
    pub score: usize,
}

/// Skill phrase -> phrase in the corpus language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTranslations {
    entries: HashMap<String, String>,
}

impl SkillTranslations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, skill: &str, translation: impl Into<String>) {
        self.entries.insert(normalize(skill), translation.into());
    }

    pub fn get(&self, skill: &str) -> Option<&str> {
        self.entries.get(&normalize(skill)).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for SkillTranslations {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut translations = SkillTranslations::new();
        for (skill, translation) in iter {
            translations.insert(&skill, translation);
        }
        translations
    }
}

/// A missing skill with its search terms precomputed
#[derive(Debug, Clone)]
struct PreparedSkill {
    original: String,
    phrases: Vec<String>,
    keywords: Vec<String>,
    significant: Vec<String>,
}

pub struct CourseRecommender {
    text_processor: TextProcessor,
    multi_token_min_matches: usize,
    max_results: Option<usize>,
}

impl Default for CourseRecommender {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl CourseRecommender {
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            text_processor: TextProcessor::new(config),
            multi_token_min_matches: config.multi_token_min_matches.max(1),
            max_results: config.max_recommendations,
        }
    }

    /// Rank courses by how many missing-skill keywords they mention
    pub fn recommend(&self, missing_skills: &[String], corpus: &[Course]) -> Vec<CourseRecommendation> {
        self.recommend_translated(missing_skills, corpus, &SkillTranslations::default())
    }

    /// Same as [`recommend`](Self::recommend), also searching corpus-language translations
    pub fn recommend_translated(
        &self,
        missing_skills: &[String],
        corpus: &[Course],
        translations: &SkillTranslations,
    ) -> Vec<CourseRecommendation> {
        let prepared: Vec<PreparedSkill> = missing_skills
            .iter()
            .filter_map(|skill| self.prepare(skill, translations))
            .collect();

        if prepared.is_empty() {
            return Vec::new();
        }

        let mut seen_titles = HashSet::new();
        let mut recommendations = Vec::new();

        for course in corpus {
            let text = course.searchable_text();
            let mut matched_skills = Vec::new();
            let mut matched_keywords = BTreeSet::new();

            for skill in &prepared {
                if let Some(keywords) = self.covers(skill, &text) {
                    matched_skills.push(skill.original.clone());
                    matched_keywords.extend(keywords);
                }
            }

            if matched_keywords.is_empty() {
                continue;
            }

            // Only matching entries claim a title
            if !seen_titles.insert(normalize(&course.title)) {
                debug!("Skipping duplicate course title: {}", course.title);
                continue;
            }

            recommendations.push(CourseRecommendation {
                course: course.clone(),
                matched_skills,
                score: matched_keywords.len(),
                matched_keywords: matched_keywords.into_iter().collect(),
            });
        }

        recommendations.sort_by(|a, b| b.score.cmp(&a.score));
        if let Some(limit) = self.max_results {
            recommendations.truncate(limit);
        }

        debug!(
            "{} courses recommended for {} missing skills",
            recommendations.len(),
            prepared.len()
        );
        recommendations
    }

    fn prepare(&self, skill: &str, translations: &SkillTranslations) -> Option<PreparedSkill> {
        let phrase = normalize(skill);
        if phrase.is_empty() {
            return None;
        }

        let mut phrases = vec![phrase];
        let mut source = skill.to_string();
        if let Some(translated) = translations.get(skill) {
            let translated_phrase = normalize(translated);
            if !translated_phrase.is_empty() && !phrases.contains(&translated_phrase) {
                phrases.push(translated_phrase);
            }
            source = format!("{} {}", skill, translated);
        }

        let keywords = self.text_processor.keywords(&source);
        let significant = self.text_processor.significant(&keywords);

        Some(PreparedSkill {
            original: skill.to_string(),
            phrases,
            keywords,
            significant,
        })
    }

    /// Keywords matched when `text` covers the skill, `None` otherwise
    fn covers(&self, skill: &PreparedSkill, text: &str) -> Option<Vec<String>> {
        let present: Vec<String> = skill
            .keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .cloned()
            .collect();

        if let Some(phrase) = skill.phrases.iter().find(|p| text.contains(p.as_str())) {
            if present.is_empty() {
                return Some(vec![phrase.clone()]);
            }
            return Some(present);
        }

        if skill.significant.is_empty() {
            return None;
        }

        let hits = skill
            .significant
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();

        let accepted = if skill.significant.len() == 1 {
            hits == 1
        } else {
            hits >= self.multi_token_min_matches
        };

        if accepted {
            Some(present)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cloud_computing_scenario() {
        let corpus = vec![
            Course::new("Distributed Infrastructure", "Introduction to cloud platforms and computing clusters"),
            Course::new("Thermodynamics", "Heat engines and entropy"),
        ];
        let recs = CourseRecommender::default().recommend(&skills(&["cloud computing"]), &corpus);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].course.title, "Distributed Infrastructure");
        assert!(recs[0].score >= 1);
        assert_eq!(recs[0].matched_skills, vec!["cloud computing"]);
    }

    #[test]
    fn test_duplicate_titles_first_wins() {
        let corpus = vec![
            Course::new("Cloud Basics", "cloud computing fundamentals"),
            Course::new("cloud basics ", "cloud computing, cloud storage and cloud security"),
        ];
        let recs = CourseRecommender::default().recommend(&skills(&["cloud computing"]), &corpus);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].course.description, "cloud computing fundamentals");
    }

    #[test]
    fn test_non_matching_duplicate_does_not_claim_title() {
        let corpus = vec![
            Course::new("Module 7", "Heat engines and entropy"),
            Course::new("Module 7", "cloud computing fundamentals"),
        ];
        let recs = CourseRecommender::default().recommend(&skills(&["cloud computing"]), &corpus);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].course.description, "cloud computing fundamentals");
    }

    #[test]
    fn test_ordered_by_score_descending() {
        let corpus = vec![
            Course::new("Databases", "Relational database design"),
            Course::new("Data Engineering", "Relational database design and cloud computing pipelines"),
        ];
        let recs = CourseRecommender::default()
            .recommend(&skills(&["database design", "cloud computing"]), &corpus);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].course.title, "Data Engineering");
        assert!(recs[0].score > recs[1].score);
    }

    #[test]
    fn test_single_significant_token_must_match() {
        let corpus = vec![Course::new("Statics", "Forces in rigid bodies")];
        let recs = CourseRecommender::default().recommend(&skills(&["apply thermodynamics"]), &corpus);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_direct_phrase_with_only_short_tokens() {
        let corpus = vec![Course::new("Systems programming in C", "Pointers and memory")];
        let recs = CourseRecommender::default().recommend(&skills(&["C"]), &corpus);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].matched_keywords, vec!["c"]);
        assert_eq!(recs[0].score, 1);
    }

    #[test]
    fn test_translation_reaches_german_corpus() {
        let corpus = vec![Course::new("Werkstoffkunde", "Grundlagen der Werkstoffprüfung und Materialwissenschaft")];
        let mut translations = SkillTranslations::new();
        translations.insert("materials testing", "Werkstoffprüfung");

        let recommender = CourseRecommender::default();
        assert!(recommender.recommend(&skills(&["materials testing"]), &corpus).is_empty());

        let recs = recommender.recommend_translated(&skills(&["materials testing"]), &corpus, &translations);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].matched_keywords.contains(&"werkstoffprüfung".to_string()));
    }

    #[test]
    fn test_pre_tagged_skills_are_searched() {
        let mut course = Course::new("Module 7", "See syllabus");
        course.skills_covered = vec!["Lean manufacturing".to_string()];
        let recs = CourseRecommender::default().recommend(&skills(&["lean manufacturing"]), &[course]);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_max_results_truncates() {
        let config = MatchingConfig {
            max_recommendations: Some(1),
            ..MatchingConfig::default()
        };
        let corpus = vec![
            Course::new("Cloud I", "cloud computing"),
            Course::new("Cloud II", "more cloud computing"),
        ];
        let recs = CourseRecommender::new(&config).recommend(&skills(&["cloud computing"]), &corpus);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_empty_missing_list() {
        let corpus = vec![Course::new("Cloud I", "cloud computing")];
        assert!(CourseRecommender::default().recommend(&[], &corpus).is_empty());
        assert!(CourseRecommender::default().recommend(&skills(&["  "]), &corpus).is_empty());
    }
}
