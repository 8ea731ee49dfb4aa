//! Prompt template for classifier-based proficiency estimation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prompt templates sent to the semantic classifier
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub level_estimation: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            level_estimation: LEVEL_ESTIMATION_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for prompt template substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptParams {
    pub possessed_skills: BTreeMap<String, u8>,
    pub required_skills: Vec<String>,
}

impl PromptTemplates {
    /// Render the batched estimation prompt for one role
    pub fn render_level_estimation(&self, params: &PromptParams) -> String {
        let possessed = if params.possessed_skills.is_empty() {
            "(none)".to_string()
        } else {
            params
                .possessed_skills
                .iter()
                .map(|(skill, level)| format!("- {}: {}", skill, level))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let required = params
            .required_skills
            .iter()
            .map(|skill| format!("- {}", skill))
            .collect::<Vec<_>>()
            .join("\n");

        self.level_estimation
            .replace("{possessed}", &possessed)
            .replace("{required}", &required)
    }
}

const LEVEL_ESTIMATION_TEMPLATE: &str = r#"Act as a Technical HR Expert and Skills Analyst.

A person declares the following skills with a self-assessed proficiency level from 1 to 9:

<POSSESSED SKILLS>
{possessed}
</POSSESSED SKILLS>

For each skill in the list below, estimate the person's proficiency level from 0 to 9,
using related or equivalent declared skills as evidence. Use 0 when nothing declared
supports the skill.

Proficiency Scale:
0 = Not possessed
1-3 = Beginner/Knowledge (Assist, Support, Execute basic tasks)
4-6 = Intermediate/Autonomous (Develop, Manage, Analyze, Solve problems)
7-9 = Expert/Strategic (Architect, Lead, Define Strategy, Mentor)

<REQUIRED SKILLS>
{required}
</REQUIRED SKILLS>

REQUIRED OUTPUT:
Return ONLY a valid JSON array with one object per required skill, using the skill names exactly as listed.
Example format:
[
    {"skill_name": "Python", "user_level": 4},
    {"skill_name": "Project Management", "user_level": 0}
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_estimation_rendering() {
        let templates = PromptTemplates::default();
        let mut possessed = BTreeMap::new();
        possessed.insert("python".to_string(), 5);
        let params = PromptParams {
            possessed_skills: possessed,
            required_skills: vec!["Django".to_string(), "Leadership".to_string()],
        };

        let prompt = templates.render_level_estimation(&params);
        assert!(prompt.contains("- python: 5"));
        assert!(prompt.contains("- Django\n- Leadership"));
        assert!(!prompt.contains("{possessed}"));
        assert!(!prompt.contains("{required}"));
    }

    #[test]
    fn test_empty_possessed_placeholder() {
        let templates = PromptTemplates::default();
        let params = PromptParams {
            possessed_skills: BTreeMap::new(),
            required_skills: vec!["Django".to_string()],
        };

        let prompt = templates.render_level_estimation(&params);
        assert!(prompt.contains("(none)"));
        assert!(prompt.contains("\"user_level\""));
    }
}
