//! Tokenization and stop-word filtering for skill phrases and course text

use crate::config::MatchingConfig;
use crate::processing::normalizer::normalize;
use regex::Regex;
use std::collections::HashSet;

/// Bilingual stop words: the subject's language (English) and the corpus
/// language (German). Articles, prepositions, auxiliaries and the generic
/// action verbs that taxonomy skill labels start with.
const STOP_WORDS: &[&str] = &[
    // German
    "und", "oder", "die", "der", "das", "den", "dem", "des", "ein", "eine", "einer",
    "einem", "eines", "für", "mit", "von", "im", "in", "zu", "auf", "aus", "an",
    "bei", "als", "um", "sie", "er", "es", "wir", "ihr", "ist", "sind", "war",
    "wird", "werden", "wenden", "führen", "durch", "stellen", "sicher", "erstellen",
    "bewerten", "verwalten", "verwenden", "überwachen", "dass", "wie", "können",
    // English
    "and", "or", "the", "a", "an", "for", "with", "from", "in", "on", "at", "to",
    "by", "as", "is", "are", "was", "were", "be", "use", "apply", "create",
    "manage", "ensure", "monitor", "execute", "develop", "system", "systems",
];

pub struct TextProcessor {
    stop_words: HashSet<String>,
    word_regex: Regex,
    min_keyword_len: usize,
    significant_keyword_len: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl TextProcessor {
    pub fn new(config: &MatchingConfig) -> Self {
        let mut stop_words = Self::create_stop_words();
        stop_words.extend(config.extra_stop_words.iter().map(|w| normalize(w)));

        let word_regex = Regex::new(r"\w+").expect("Invalid word regex");

        Self {
            stop_words,
            word_regex,
            min_keyword_len: config.min_keyword_len,
            significant_keyword_len: config.significant_keyword_len,
        }
    }

    /// Lowercase word tokens in order of appearance, duplicates included
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.word_regex
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Distinct keywords of a phrase: long enough and not a stop word
    pub fn keywords(&self, phrase: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenize(phrase)
            .into_iter()
            .filter(|t| self.is_keyword(t))
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// The subset of `keywords` long enough to decide a match on their own
    pub fn significant(&self, keywords: &[String]) -> Vec<String> {
        keywords
            .iter()
            .filter(|k| k.chars().count() >= self.significant_keyword_len)
            .cloned()
            .collect()
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn is_keyword(&self, token: &str) -> bool {
        token.chars().count() >= self.min_keyword_len && !self.is_stop_word(token)
    }

    fn create_stop_words() -> HashSet<String> {
        STOP_WORDS.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization_splits_on_non_word() {
        let processor = TextProcessor::default();
        let tokens = processor.tokenize("Cloud-Computing, (AWS)/Azure");
        assert_eq!(tokens, vec!["cloud", "computing", "aws", "azure"]);
    }

    #[test]
    fn test_keywords_drop_short_and_stop_words() {
        let processor = TextProcessor::default();
        let keywords = processor.keywords("Manage the IT systems and databases");
        assert_eq!(keywords, vec!["databases"]);
    }

    #[test]
    fn test_german_stop_words() {
        let processor = TextProcessor::default();
        let keywords = processor.keywords("Projekte verwalten und überwachen");
        assert_eq!(keywords, vec!["projekte"]);
    }

    #[test]
    fn test_keywords_deduplicated() {
        let processor = TextProcessor::default();
        let keywords = processor.keywords("cloud cloud computing Cloud");
        assert_eq!(keywords, vec!["cloud", "computing"]);
    }

    #[test]
    fn test_significant_threshold() {
        let processor = TextProcessor::default();
        let keywords = processor.keywords("cloud api computing");
        assert_eq!(processor.significant(&keywords), vec!["cloud", "computing"]);
    }

    #[test]
    fn test_extra_stop_words_from_config() {
        let config = MatchingConfig {
            extra_stop_words: vec!["Kenntnisse".to_string()],
            ..MatchingConfig::default()
        };
        let processor = TextProcessor::new(&config);
        assert!(processor.is_stop_word("kenntnisse"));
        assert!(processor.keywords("Kenntnisse Thermodynamik").contains(&"thermodynamik".to_string()));
    }

    #[test]
    fn test_umlauts_are_word_characters() {
        let processor = TextProcessor::default();
        let tokens = processor.tokenize("Qualitätsprüfung durchführen");
        assert_eq!(tokens, vec!["qualitätsprüfung", "durchführen"]);
    }
}
