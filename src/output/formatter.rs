//! Output formatters: console, JSON and Markdown renderings of a gap report

use crate::config::OutputFormat;
use crate::error::{Result, SkillGapError};
use crate::output::report::GapAnalysisReport;
use crate::processing::analyzer::RoleOutcome;
use crate::processing::course_recommender::CourseRecommendation;
use crate::processing::gap_scorer::{RoleGapReport, SkillGapEntry};
use crate::processing::skills::GapStatus;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering a gap analysis report
pub trait OutputFormatter {
    fn format_report(&self, report: &GapAnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
    detailed: bool,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn level_cell(level: Option<u8>) -> String {
    level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
}

fn gap_cell(gap: Option<i32>) -> String {
    match gap {
        Some(g) if g > 0 => format!("+{}", g),
        Some(g) => g.to_string(),
        None => "-".to_string(),
    }
}

fn ects_label(rec: &CourseRecommendation) -> String {
    rec.course
        .ects
        .map(|e| format!("{} ECTS", e))
        .unwrap_or_else(|| "ECTS n/a".to_string())
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            100 => ("COMPLETE", Color::Green),
            75..=99 => ("STRONG", Color::BrightGreen),
            50..=74 => ("PARTIAL", Color::Yellow),
            25..=49 => ("WEAK", Color::Red),
            _ => ("DISTANT", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn status_color(status: GapStatus) -> Color {
        match status {
            GapStatus::Missing => Color::Red,
            GapStatus::Gap => Color::Yellow,
            GapStatus::Match => Color::Green,
            GapStatus::Overskilled => Color::Cyan,
        }
    }

    fn format_entry(&self, entry: &SkillGapEntry) -> String {
        let status = self.colorize(&format!("{:<11}", entry.status.to_string()), Self::status_color(entry.status));
        let mut line = format!(
            "  {} {:<32} required {:>2}  subject {:>2}  gap {:>3}\n",
            status,
            entry.skill_name,
            level_cell(entry.required_level),
            level_cell(entry.subject_level),
            gap_cell(entry.gap)
        );
        if let Some(rationale) = &entry.rationale {
            line.push_str(&format!("              {}\n", self.colorize(rationale, Color::BrightBlack)));
        }
        line
    }

    fn format_role(&self, report: &RoleGapReport) -> String {
        let mut output = self.format_header(&format!("{} ({})", report.role_title, report.role_id), 2);
        output.push_str(&format!(
            "Match: {}% {} | {} of {} skills\n",
            report.match_score,
            self.format_score_badge(report.match_score),
            report.matching_skills.len(),
            report.total_required
        ));

        if !report.matching_skills.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("✔ Matching:", Color::Green),
                report.matching_skills.join(", ")
            ));
        }
        if !report.gap_skills.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("▲ Below level:", Color::Yellow),
                report.gap_skills.join(", ")
            ));
        }
        if !report.missing_skills.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize("✘ Missing:", Color::Red),
                report.missing_skills.join(", ")
            ));
        }

        if self.detailed && !report.entries.is_empty() {
            output.push('\n');
            for entry in &report.entries {
                output.push_str(&self.format_entry(entry));
            }
        }
        output
    }

    fn format_recommendation(&self, index: usize, rec: &CourseRecommendation) -> String {
        let mut output = format!(
            "{}. {} ({}, score {})\n",
            index,
            self.colorize(&rec.course.title, Color::Cyan),
            ects_label(rec),
            rec.score
        );
        output.push_str(&format!("   Covers: {}\n", rec.matched_skills.join(", ")));
        if self.detailed {
            output.push_str(&format!("   Keywords: {}\n", rec.matched_keywords.join(", ")));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &GapAnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("SKILL GAP ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));
        if let Some(mode) = report.metadata.mode {
            output.push_str(&format!("Mode: {}", mode));
            if let Some(model) = &report.metadata.classifier_model {
                output.push_str(&format!(" ({})", model));
            }
            output.push('\n');
        }
        if let Some(subject) = &report.subject {
            output.push_str(&format!(
                "Subject: {} [{}] with {} declared skills\n",
                self.colorize(&subject.name, Color::Cyan),
                subject.id,
                subject.skill_count
            ));
        }

        if !report.outcomes.is_empty() {
            if let Some(best) = &report.summary.best_match {
                output.push_str(&format!(
                    "Best match: {} at {}%\n",
                    self.colorize(&best.role_title, Color::Green),
                    best.match_score
                ));
            }

            for outcome in &report.outcomes {
                match outcome {
                    RoleOutcome::Evaluated(role) => output.push_str(&self.format_role(role)),
                    RoleOutcome::NotFound { role_id, reason } => {
                        output.push_str(&self.format_header(role_id, 2));
                        output.push_str(&format!("{} {}\n", self.colorize("⚠ Not evaluated:", Color::Yellow), reason));
                    }
                }
            }
        }

        if !report.skills_to_improve.is_empty() {
            output.push_str(&self.format_header("Skills To Improve", 3));
            for skill in &report.skills_to_improve {
                output.push_str(&format!("  • {}\n", skill));
            }
        }

        output.push_str(&self.format_header("Recommended Courses", 3));
        if report.recommendations.is_empty() {
            output.push_str("No matching courses found.\n");
        } else {
            for (i, rec) in report.recommendations.iter().enumerate() {
                output.push_str(&self.format_recommendation(i + 1, rec));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &GapAnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool, detailed: bool) -> Self {
        Self { include_metadata, detailed }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }

    fn format_role(&self, report: &RoleGapReport) -> String {
        let mut output = format!("## {} (`{}`)\n\n", report.role_title, report.role_id);
        output.push_str(&format!(
            "**Match score:** {}% ({} of {} skills)\n\n",
            report.match_score,
            report.matching_skills.len(),
            report.total_required
        ));

        if self.detailed {
            output.push_str("| Skill | Required | Subject | Gap | Status |\n");
            output.push_str("|---|---|---|---|---|\n");
            for entry in &report.entries {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    Self::escape_cell(&entry.skill_name),
                    level_cell(entry.required_level),
                    level_cell(entry.subject_level),
                    gap_cell(entry.gap),
                    entry.status
                ));
            }
            output.push('\n');
        } else {
            if !report.missing_skills.is_empty() {
                output.push_str(&format!("**Missing:** {}\n\n", report.missing_skills.join(", ")));
            }
            if !report.gap_skills.is_empty() {
                output.push_str(&format!("**Below level:** {}\n\n", report.gap_skills.join(", ")));
            }
        }
        output
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &GapAnalysisReport) -> Result<String> {
        let mut output = String::from("# Skill Gap Analysis\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
            if let Some(mode) = report.metadata.mode {
                output.push_str(&format!("**Mode:** {}\n", mode));
            }
            output.push('\n');
        }

        if let Some(subject) = &report.subject {
            output.push_str(&format!(
                "**Subject:** {} (`{}`), {} declared skills\n\n",
                subject.name, subject.id, subject.skill_count
            ));
        }

        for outcome in &report.outcomes {
            match outcome {
                RoleOutcome::Evaluated(role) => output.push_str(&self.format_role(role)),
                RoleOutcome::NotFound { role_id, reason } => {
                    output.push_str(&format!("## `{}`\n\n> Not evaluated: {}\n\n", role_id, reason));
                }
            }
        }

        if !report.skills_to_improve.is_empty() {
            output.push_str("## Skills To Improve\n\n");
            for skill in &report.skills_to_improve {
                output.push_str(&format!("- {}\n", skill));
            }
            output.push('\n');
        }

        output.push_str("## Recommended Courses\n\n");
        if report.recommendations.is_empty() {
            output.push_str("_No matching courses found._\n");
        } else {
            output.push_str("| # | Course | ECTS | Score | Covers |\n");
            output.push_str("|---|---|---|---|---|\n");
            for (i, rec) in report.recommendations.iter().enumerate() {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    i + 1,
                    Self::escape_cell(&rec.course.title),
                    rec.course.ects.map(|e| e.to_string()).unwrap_or_else(|| "-".to_string()),
                    rec.score,
                    Self::escape_cell(&rec.matched_skills.join(", "))
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata, detailed),
        }
    }

    pub fn generate_report(&self, report: &GapAnalysisReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content).map_err(|e| {
        SkillGapError::OutputFormatting(format!("Failed to write {}: {}", file_path.display(), e))
    })
}

pub fn suggest_filename(format: OutputFormat, subject_id: &str, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_skill_gap{}.{}", subject_id, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluationMode;
    use crate::processing::course_recommender::Course;
    use crate::processing::gap_scorer::GapScorer;
    use crate::processing::skills::{LevelMap, PossessedSkills, RoleSkillProfile, SkillRequirement, Subject};
    use tempfile::TempDir;

    fn sample_report() -> GapAnalysisReport {
        let role = RoleSkillProfile::new("dev", "Software developer")
            .with_skill(SkillRequirement::leveled("Python", 4))
            .with_skill(SkillRequirement::leveled("Leadership", 7).with_rationale("leads a team"));
        let levels: LevelMap = [("python".to_string(), 4)].into_iter().collect();
        let scored = GapScorer::new().score(&role, &levels, EvaluationMode::Leveled);

        let mut course = Course::new("Leading Teams", "leadership for engineers");
        course.ects = Some(5);
        let rec = CourseRecommendation {
            course,
            matched_skills: vec!["Leadership".to_string()],
            matched_keywords: vec!["leadership".to_string()],
            score: 1,
        };

        let subject = Subject::new("ada", "Ada", PossessedSkills::Names(vec!["Python".to_string()]));
        GapAnalysisReport::new(
            &subject,
            EvaluationMode::Leveled,
            vec![
                RoleOutcome::Evaluated(scored),
                RoleOutcome::NotFound {
                    role_id: "ghost".to_string(),
                    reason: "Role not found: ghost".to_string(),
                },
            ],
            vec!["Leadership".to_string()],
            vec![rec],
            7,
        )
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();

        assert!(output.contains("SKILL GAP ANALYSIS"));
        assert!(output.contains("Match: 50% [PARTIAL]"));
        assert!(output.contains("✘ Missing: Leadership"));
        assert!(output.contains("MISSING"));
        assert!(output.contains("leads a team"));
        assert!(output.contains("Not evaluated: Role not found: ghost"));
        assert!(output.contains("1. Leading Teams (5 ECTS, score 1)"));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_json_round_trips_through_serde() {
        let output = JsonFormatter::new(false).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["summary"]["roles_not_found"], 1);
        assert_eq!(value["outcomes"][0]["entries"][1]["status"], "MISSING");
        assert_eq!(value["metadata"]["mode"], "leveled");
    }

    #[test]
    fn test_markdown_detailed_table() {
        let output = MarkdownFormatter::new(false, true).format_report(&sample_report()).unwrap();

        assert!(output.starts_with("# Skill Gap Analysis"));
        assert!(output.contains("| Leadership | 7 | 0 | +7 | MISSING |"));
        assert!(output.contains("| 1 | Leading Teams | 5 | 1 | Leadership |"));
        assert!(output.contains("> Not evaluated: Role not found: ghost"));
    }

    #[test]
    fn test_generator_dispatch_and_save() {
        let generator = ReportGenerator::with_options(false, false, true, true);
        let report = sample_report();
        let json = generator.generate_report(&report, OutputFormat::Json).unwrap();
        assert!(json.contains('\n'));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join(suggest_filename(OutputFormat::Markdown, "ada", false));
        let markdown = generator.generate_report(&report, OutputFormat::Markdown).unwrap();
        save_report_to_file(&markdown, &path).unwrap();

        assert!(path.ends_with("ada_skill_gap.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), markdown);
    }
}
