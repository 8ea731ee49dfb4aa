//! Role resolution against a loaded role catalog

use crate::error::{Result, SkillGapError};
use crate::processing::normalizer::normalize;
use crate::processing::skills::RoleSkillProfile;
use log::warn;
use std::collections::HashMap;

/// Looks up the required-skill snapshot of a role
pub trait RoleResolver: Send + Sync {
    /// `SkillGapError::RoleNotFound` when the identifier is unknown
    fn resolve_role(&self, identifier: &str) -> Result<RoleSkillProfile>;
}

/// In-memory catalog indexed by role id and by title
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    roles: Vec<RoleSkillProfile>,
    by_id: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
}

impl RoleCatalog {
    pub fn new(roles: Vec<RoleSkillProfile>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_title = HashMap::new();

        for (idx, role) in roles.iter().enumerate() {
            if by_id.contains_key(&role.role_id) {
                warn!("Duplicate role id {} in catalog, keeping the first", role.role_id);
                continue;
            }
            by_id.insert(role.role_id.clone(), idx);
            by_title.entry(normalize(&role.role_title)).or_insert(idx);
        }

        Self { roles, by_id, by_title }
    }

    pub fn roles(&self) -> &[RoleSkillProfile] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl RoleResolver for RoleCatalog {
    fn resolve_role(&self, identifier: &str) -> Result<RoleSkillProfile> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(SkillGapError::RoleNotFound("empty role identifier".to_string()));
        }

        self.by_id
            .get(identifier)
            .or_else(|| self.by_title.get(&normalize(identifier)))
            .map(|idx| self.roles[*idx].clone())
            .ok_or_else(|| SkillGapError::RoleNotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::skills::SkillRequirement;

    fn catalog() -> RoleCatalog {
        RoleCatalog::new(vec![
            RoleSkillProfile::new("2512", "Software developer").with_skill(SkillRequirement::named("Python")),
            RoleSkillProfile::new("2421", "Management analyst").with_skill(SkillRequirement::named("Excel")),
            RoleSkillProfile::new("2512", "Duplicate entry"),
        ])
    }

    #[test]
    fn test_resolve_by_id_then_title() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve_role("2512").unwrap().role_title, "Software developer");
        assert_eq!(catalog.resolve_role(" management ANALYST ").unwrap().role_id, "2421");
    }

    #[test]
    fn test_unknown_role() {
        let catalog = catalog();
        assert!(matches!(catalog.resolve_role("9999"), Err(SkillGapError::RoleNotFound(_))));
        assert!(matches!(catalog.resolve_role("Duplicate entry"), Err(SkillGapError::RoleNotFound(_))));
        assert!(matches!(catalog.resolve_role("  "), Err(SkillGapError::RoleNotFound(_))));
    }
}
