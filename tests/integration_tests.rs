//! Integration tests for the skill-gap engine

use serde_json::json;
use skill_gap::config::{ClassifierConfig, Config, EvaluationMode, OutputFormat};
use skill_gap::input::InputManager;
use skill_gap::llm::{EstimatorSettings, GeminiClassifier, SemanticLevelEstimator};
use skill_gap::output::{GapAnalysisReport, ReportGenerator};
use skill_gap::processing::skills::GapStatus;
use skill_gap::processing::{skills_to_improve, GapEngine, RoleOutcome};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn roles(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn engine() -> GapEngine {
    let mut config = Config::default();
    config.classifier.role_delay_ms = 0;
    GapEngine::new(&config)
}

#[tokio::test]
async fn test_lexical_gap_from_fixtures() {
    let mut manager = InputManager::new();
    let subject = manager.load_subject(Path::new("tests/fixtures/subject.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();
    assert_eq!(catalog.len(), 3);

    let outcomes = engine().lexical_gap(&subject, &roles(&["2512", "Database Designer", "2523", "9999"]), &catalog);
    assert_eq!(outcomes.len(), 4);

    for outcome in &outcomes[..3] {
        let report = outcome.report().unwrap();
        assert_eq!(report.match_score, 50);
        assert_eq!(report.total_required, report.matching_skills.len() + report.missing_skills.len());
    }
    assert_eq!(outcomes[1].role_id(), "2521");
    assert_eq!(outcomes[2].report().unwrap().missing_skills, vec!["Linux kernel"]);
    assert!(matches!(&outcomes[3], RoleOutcome::NotFound { role_id, .. } if role_id == "9999"));
}

#[tokio::test]
async fn test_leveled_gap_from_fixtures() {
    let mut manager = InputManager::new();
    let subject = manager.load_subject(Path::new("tests/fixtures/subject.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();

    let outcomes = engine().leveled_gap(&subject, &roles(&["2512", "2521"]), &catalog);

    let developer = outcomes[0].report().unwrap();
    assert_eq!(developer.match_score, 50);
    assert_eq!(developer.entries[0].status, GapStatus::Match);
    assert_eq!(developer.entries[0].rationale.as_deref(), Some("Primary implementation language"));
    assert_eq!(developer.entries[1].status, GapStatus::Missing);
    assert_eq!(developer.entries[1].gap, Some(7));

    // Unscored requirements compare against level 0
    let designer = outcomes[1].report().unwrap();
    assert_eq!(designer.entries[0].status, GapStatus::Overskilled);
    assert_eq!(designer.entries[0].gap, Some(-6));
    assert_eq!(designer.entries[1].status, GapStatus::Missing);
}

#[tokio::test]
async fn test_team_subject_aggregation() {
    let mut manager = InputManager::new();
    let team = manager.load_subject(Path::new("tests/fixtures/team.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();

    assert_eq!(team.name, "Apollo project");
    let levels = team.skills.level_map();
    assert_eq!(levels.get("python"), Some(&3));
    assert_eq!(levels.get("cobol"), Some(&1));
    assert_eq!(levels.get("linux kernel"), Some(&1));

    let outcomes = engine().leveled_gap(&team, &roles(&["2512", "2523"]), &catalog);
    let developer = outcomes[0].report().unwrap();
    assert_eq!(developer.match_score, 0);
    assert_eq!(developer.gap_skills, vec!["Python", "Leadership"]);

    let cloud = outcomes[1].report().unwrap();
    assert_eq!(cloud.missing_skills, vec!["Cloud computing"]);
    assert_eq!(cloud.gap_skills, vec!["Linux kernel"]);
}

#[tokio::test]
async fn test_course_recommendation_pipeline() {
    let mut manager = InputManager::new();
    let subject = manager.load_subject(Path::new("tests/fixtures/subject.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();
    let courses = manager.load_courses(Path::new("tests/fixtures/courses.json")).await.unwrap();
    let translations = manager
        .load_translations(Path::new("tests/fixtures/translations.json"))
        .await
        .unwrap();
    assert_eq!(courses.len(), 5);
    assert_eq!(courses[0].ects, Some(5));

    let engine = engine();
    let outcomes = engine.lexical_gap(&subject, &roles(&["2512", "2521"]), &catalog);
    let missing = skills_to_improve(&outcomes);
    assert_eq!(missing, vec!["Leadership", "Database design"]);

    let recs = engine.recommend_courses(&missing, &courses, &translations);
    let titles: Vec<&str> = recs.iter().map(|r| r.course.title.as_str()).collect();
    assert_eq!(titles, vec!["Datenbanksysteme", "Führung im Team"]);
    assert_eq!(recs[0].matched_skills, vec!["Database design"]);
    assert_eq!(recs[0].score, 2);
    assert_eq!(recs[1].matched_skills, vec!["Leadership"]);
    assert_eq!(recs[1].score, 2);
}

#[tokio::test]
async fn test_cloud_course_deduplicated() {
    let courses = InputManager::new()
        .load_courses(Path::new("tests/fixtures/courses.json"))
        .await
        .unwrap();

    let recs = engine().recommend_courses(&roles(&["cloud computing"]), &courses, &Default::default());
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].course.title, "Distributed Infrastructure");
    assert_eq!(recs[0].matched_keywords, vec!["cloud", "computing"]);
}

fn classifier_config(server: &MockServer) -> ClassifierConfig {
    ClassifierConfig {
        base_url: server.uri(),
        model: "test-model".to_string(),
        timeout_secs: 5,
        backoff_base_ms: 10,
        ..ClassifierConfig::default()
    }
}

#[tokio::test]
async fn test_semantic_gap_against_mock_classifier() {
    let server = MockServer::start().await;
    let answer = "```json\n[{\"skill_name\": \"Python\", \"user_level\": 5}, {\"skill_name\": \"Leadership\", \"user_level\": \"3\"}]\n```";
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": answer }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = classifier_config(&server);
    let classifier = GeminiClassifier::with_api_key(&config, "test-key").unwrap();
    let engine = engine().with_estimator(SemanticLevelEstimator::new(
        Arc::new(classifier),
        EstimatorSettings::from(&config),
    ));

    let mut manager = InputManager::new();
    let subject = manager.load_subject(Path::new("tests/fixtures/subject.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();

    let outcomes = engine
        .evaluate(EvaluationMode::Semantic, &subject, &roles(&["2512"]), &catalog, &CancellationToken::new())
        .await
        .unwrap();
    let report = outcomes[0].report().unwrap();

    assert_eq!(report.mode, EvaluationMode::Semantic);
    assert_eq!(report.entries[0].status, GapStatus::Overskilled);
    assert_eq!(report.entries[1].status, GapStatus::Gap);
    assert_eq!(report.entries[1].gap, Some(4));
    assert_eq!(report.match_score, 50);
}

#[tokio::test]
async fn test_unavailable_classifier_degrades_to_all_missing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let config = classifier_config(&server);
    let classifier = GeminiClassifier::with_api_key(&config, "test-key").unwrap();
    let engine = engine().with_estimator(SemanticLevelEstimator::new(
        Arc::new(classifier),
        EstimatorSettings::from(&config),
    ));

    let mut manager = InputManager::new();
    let subject = manager.load_subject(Path::new("tests/fixtures/subject.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();

    let outcomes = engine
        .semantic_gap(&subject, &roles(&["2512"]), &catalog, &CancellationToken::new())
        .await
        .unwrap();
    let report = outcomes[0].report().unwrap();

    assert_eq!(report.match_score, 0);
    assert!(report.entries.iter().all(|e| e.status == GapStatus::Missing));
}

#[tokio::test]
async fn test_full_report_rendering() {
    let mut manager = InputManager::new();
    let subject = manager.load_subject(Path::new("tests/fixtures/subject.json")).await.unwrap();
    let catalog = manager.load_catalog(Path::new("tests/fixtures/catalog.json")).await.unwrap();
    let courses = manager.load_courses(Path::new("tests/fixtures/courses.json")).await.unwrap();

    let engine = engine();
    let outcomes = engine.leveled_gap(&subject, &roles(&["2512", "2523"]), &catalog);
    let missing = skills_to_improve(&outcomes);
    let recs = engine.recommend_courses(&missing, &courses, &Default::default());

    let report = GapAnalysisReport::new(&subject, EvaluationMode::Leveled, outcomes, missing, recs, 1)
        .with_sources("tests/fixtures/subject.json", "tests/fixtures/catalog.json");
    assert_eq!(report.summary.roles_evaluated, 2);

    let generator = ReportGenerator::with_options(false, true, true, true);
    let console = generator.generate_report(&report, OutputFormat::Console).unwrap();
    assert!(console.contains("Software developer (2512)"));
    assert!(console.contains("Ada Lovelace"));

    let json = generator.generate_report(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["catalog_file"], "tests/fixtures/catalog.json");
    assert_eq!(value["outcomes"][1]["role_id"], "2523");

    let markdown = generator.generate_report(&report, OutputFormat::Markdown).unwrap();
    assert!(markdown.contains("## Cloud engineer (`2523`)"));
}
