//! skill-gap: competency gap analysis and course recommendation

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use skill_gap::cli::{self, Cli, Commands, ConfigAction};
use skill_gap::config::{Config, EvaluationMode, OutputFormat};
use skill_gap::error::{Result, SkillGapError};
use skill_gap::input::InputManager;
use skill_gap::llm::{EstimatorSettings, GeminiClassifier, SemanticLevelEstimator};
use skill_gap::output::formatter::{save_report_to_file, ReportGenerator};
use skill_gap::output::GapAnalysisReport;
use skill_gap::processing::course_recommender::SkillTranslations;
use skill_gap::processing::{skills_to_improve, GapEngine};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Gap {
            subject,
            catalog,
            roles,
            mode,
            courses,
            translations,
            output,
            save,
            detailed,
        } => {
            let mode = match mode {
                Some(m) => cli::parse_evaluation_mode(&m).map_err(SkillGapError::InvalidInput)?,
                None => config.evaluation.default_mode,
            };
            let format = resolve_format(output.as_deref(), &config)?;

            cli::validate_file_extension(&subject, &["json", "toml"])
                .map_err(|e| SkillGapError::InvalidInput(format!("Subject file: {}", e)))?;
            cli::validate_file_extension(&catalog, &["json", "toml"])
                .map_err(|e| SkillGapError::InvalidInput(format!("Catalog file: {}", e)))?;

            let mut engine = GapEngine::new(&config);
            engine.validate_targets(&roles)?;

            let mut classifier_model = None;
            if mode == EvaluationMode::Semantic {
                let classifier = GeminiClassifier::new(&config.classifier)?;
                classifier_model = Some(config.classifier.model.clone());
                engine = engine.with_estimator(SemanticLevelEstimator::new(
                    Arc::new(classifier),
                    EstimatorSettings::from(&config.classifier),
                ));
            }

            let started = Instant::now();
            let mut input_manager = InputManager::new();
            let subject_record = input_manager.load_subject(&subject).await?;
            let role_catalog = input_manager.load_catalog(&catalog).await?;

            info!("Evaluating {} against {} roles in {} mode", subject_record.id, roles.len(), mode);

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling evaluation");
                    ctrl_c.cancel();
                }
            });

            let spinner = (mode == EvaluationMode::Semantic).then(|| semantic_spinner(roles.len()));
            let evaluation = engine
                .evaluate(mode, &subject_record, &roles, &role_catalog, &cancel)
                .await;
            if let Some(spinner) = &spinner {
                spinner.finish_and_clear();
            }
            let outcomes = evaluation?;

            let to_improve = skills_to_improve(&outcomes);
            let recommendations = match &courses {
                Some(path) => {
                    let corpus = input_manager.load_courses(path).await?;
                    let translations = load_translations(&mut input_manager, translations.as_deref()).await?;
                    engine.recommend_courses(&to_improve, &corpus, &translations)
                }
                None => Vec::new(),
            };

            let mut report = GapAnalysisReport::new(
                &subject_record,
                mode,
                outcomes,
                to_improve,
                recommendations,
                started.elapsed().as_millis() as u64,
            )
            .with_sources(subject.display().to_string(), catalog.display().to_string());
            if let Some(model) = classifier_model {
                report = report.with_classifier_model(model);
            }

            emit(&report, format, detailed || config.output.detailed, &config, save.as_deref())?;
        }

        Commands::Recommend {
            courses,
            skills,
            translations,
            output,
            save,
        } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let started = Instant::now();

            let mut input_manager = InputManager::new();
            let corpus = input_manager.load_courses(&courses).await?;
            let translations = load_translations(&mut input_manager, translations.as_deref()).await?;

            let engine = GapEngine::new(&config);
            let recommendations = engine.recommend_courses(&skills, &corpus, &translations);
            info!("{} of {} courses match", recommendations.len(), corpus.len());

            let report =
                GapAnalysisReport::recommendations_only(skills, recommendations, started.elapsed().as_millis() as u64);
            emit(&report, format, config.output.detailed, &config, save.as_deref())?;
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| SkillGapError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("# {}\n{}", config_path.display(), rendered);
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset to defaults at {}", config_path.display());
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}

fn resolve_format(output: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match output {
        Some(format) => cli::parse_output_format(format).map_err(SkillGapError::InvalidInput),
        None => Ok(config.output.format),
    }
}

async fn load_translations(input_manager: &mut InputManager, path: Option<&Path>) -> Result<SkillTranslations> {
    match path {
        Some(path) => input_manager.load_translations(path).await,
        None => Ok(SkillTranslations::default()),
    }
}

fn semantic_spinner(role_count: usize) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Estimating skill levels for {} roles", role_count));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn emit(
    report: &GapAnalysisReport,
    format: OutputFormat,
    detailed: bool,
    config: &Config,
    save: Option<&Path>,
) -> Result<()> {
    let use_colors = config.output.color_output && save.is_none();
    let generator = ReportGenerator::with_options(use_colors, detailed, true, true);
    let rendered = generator.generate_report(report, format)?;

    match save {
        Some(path) => {
            save_report_to_file(&rendered, path)?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
