//! CLI interface for the skill-gap engine

use crate::config::{EvaluationMode, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "skill-gap")]
#[command(about = "Competency gap analysis against occupational roles")]
#[command(long_about = "Compare a person's or a team's skills with the essential skills of target roles, \
score the gaps and recommend courses that close them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a subject against one or more target roles
    Gap {
        /// Subject or team file (JSON, TOML)
        #[arg(short, long)]
        subject: PathBuf,

        /// Role catalog file (JSON, TOML)
        #[arg(long)]
        catalog: PathBuf,

        /// Target role id or title, repeatable
        #[arg(short, long = "role", required = true)]
        roles: Vec<String>,

        /// Evaluation mode: lexical, leveled, semantic
        #[arg(short, long)]
        mode: Option<String>,

        /// Course corpus used for recommendations (JSON)
        #[arg(long)]
        courses: Option<PathBuf>,

        /// Skill name translations into the corpus language (JSON)
        #[arg(long)]
        translations: Option<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Show per-skill entries
        #[arg(short, long)]
        detailed: bool,
    },

    /// Recommend courses for a list of skills
    Recommend {
        /// Course corpus (JSON)
        #[arg(long)]
        courses: PathBuf,

        /// Skill to find courses for, repeatable
        #[arg(short, long = "skill", required = true)]
        skills: Vec<String>,

        /// Skill name translations into the corpus language (JSON)
        #[arg(long)]
        translations: Option<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Parse and validate evaluation mode
pub fn parse_evaluation_mode(mode: &str) -> Result<EvaluationMode, String> {
    match mode.to_lowercase().as_str() {
        "lexical" | "exact" => Ok(EvaluationMode::Lexical),
        "leveled" | "levelled" => Ok(EvaluationMode::Leveled),
        "semantic" => Ok(EvaluationMode::Semantic),
        _ => Err(format!("Invalid evaluation mode: {}. Supported: lexical, leveled, semantic", mode)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_gap_command_parses_repeated_roles() {
        let cli = Cli::parse_from([
            "skill-gap", "gap", "--subject", "ada.json", "--catalog", "roles.json",
            "--role", "2512", "--role", "Data analyst", "--mode", "leveled",
        ]);
        match cli.command {
            Commands::Gap { roles, mode, .. } => {
                assert_eq!(roles, vec!["2512", "Data analyst"]);
                assert_eq!(mode.as_deref(), Some("leveled"));
            }
            _ => panic!("expected gap command"),
        }
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("pdf").is_err());
        assert_eq!(parse_evaluation_mode("Semantic"), Ok(EvaluationMode::Semantic));
        assert!(parse_evaluation_mode("fuzzy").is_err());
        assert!(validate_file_extension(Path::new("a.toml"), &["json", "toml"]).is_ok());
        assert!(validate_file_extension(Path::new("a"), &["json"]).is_err());
    }
}
