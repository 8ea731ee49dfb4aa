//! Input manager for loading subjects, role catalogs and course corpora

use crate::error::{Result, SkillGapError};
use crate::input::catalog::RoleCatalog;
use crate::input::file_detector::FileType;
use crate::input::records::{RawCatalog, RawCorpus, RawSubject, RawTranslations};
use crate::processing::course_recommender::{Course, SkillTranslations};
use crate::processing::skills::Subject;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Load one person, or a team aggregated from its members
    pub async fn load_subject(&mut self, path: &Path) -> Result<Subject> {
        let raw: RawSubject = self.load_record(path).await?;
        let fallback_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("subject")
            .to_string();

        let subject = raw.into_subject(&fallback_id);
        info!("Loaded subject {} with {} skills", subject.id, subject.skills.len());
        Ok(subject)
    }

    pub async fn load_catalog(&mut self, path: &Path) -> Result<RoleCatalog> {
        let raw: RawCatalog = self.load_record(path).await?;
        let catalog = RoleCatalog::new(raw.into_profiles());
        info!("Loaded {} roles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub async fn load_courses(&mut self, path: &Path) -> Result<Vec<Course>> {
        let raw: RawCorpus = self.load_record(path).await?;
        let courses = raw.into_courses();
        info!("Loaded {} courses from {}", courses.len(), path.display());
        Ok(courses)
    }

    pub async fn load_translations(&mut self, path: &Path) -> Result<SkillTranslations> {
        let raw: RawTranslations = self.load_record(path).await?;
        let translations = raw.into_translations();
        info!("Loaded {} skill translations", translations.len());
        Ok(translations)
    }

    async fn load_record<T: DeserializeOwned>(&mut self, path: &Path) -> Result<T> {
        let file_type = self.detect_file_type(path)?;
        let contents = self.read_contents(path).await?;

        match file_type {
            FileType::Json => serde_json::from_str(&contents).map_err(|e| {
                SkillGapError::InvalidInput(format!("{}: {}", path.display(), e))
            }),
            FileType::Toml => toml::from_str(&contents).map_err(|e| {
                SkillGapError::InvalidInput(format!("{}: {}", path.display(), e))
            }),
            FileType::Unknown => Err(SkillGapError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            ))),
        }
    }

    async fn read_contents(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached) = self.cache.get(path) {
                debug!("Using cached contents for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(SkillGapError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), contents.clone());
        }
        Ok(contents)
    }

    fn detect_file_type(&self, path: &Path) -> Result<FileType> {
        if path.extension().is_none() {
            return Err(SkillGapError::InvalidInput(format!(
                "File has no extension: {}",
                path.display()
            )));
        }
        Ok(FileType::from_path(path))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
