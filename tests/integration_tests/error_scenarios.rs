//! Error scenario integration tests
//!
//! Failure modes a deployment actually hits:
//! 1. Translation service errors and timeouts
//! 2. Rejected reports and their error categories
//! 3. Guided capture refusing bad input

use serde_json::json;
use shiftlog::cache::TranslationCache;
use shiftlog::config::TranslationConfig;
use shiftlog::models::Service;
use shiftlog::error::{Error, ErrorCategory, ShiftlogErrorTrait};
use shiftlog::parser::{parse_report, ParseError, RequiredField};
use shiftlog::session::{GuidedError, GuidedReport, GuidedState, GuidedStep};
use shiftlog::translation::{Annotator, HttpTranslator, Translator};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::day;

fn translation_config(server: &MockServer, timeout_ms: u64) -> TranslationConfig {
    TranslationConfig {
        enabled: true,
        endpoint: format!("{}/translate", server.uri()),
        target_lang: "en".to_string(),
        timeout_ms,
        api_key: None,
    }
}

fn annotator(config: &TranslationConfig) -> Annotator {
    Annotator::from_config(config, Arc::new(TranslationCache::new())).unwrap()
}

// ============================================================================
// Translation Service Tests
// ============================================================================

#[tokio::test]
async fn test_translation_request_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(json!({
            "q": "música alta",
            "source": "auto",
            "target": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translatedText": "loud music"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translator = HttpTranslator::new(&translation_config(&server, 2000)).unwrap();
    let translated = translator.translate("música alta").await.unwrap();
    assert_eq!(translated, "loud music");
}

#[tokio::test]
async fn test_translation_cached_after_first_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translatedText": "loud music"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let annotator = annotator(&translation_config(&server, 2000));
    let out = annotator.annotate_all(["música alta", "música alta"]).await;

    assert_eq!(out, vec!["música alta (loud music)", "música alta (loud music)"]);
    assert_eq!(annotator.cache().len(), 1);
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(2)
        .mount(&server)
        .await;

    let config = translation_config(&server, 2000);
    let translator = HttpTranslator::new(&config).unwrap();
    let err = translator.translate("horno roto").await.unwrap_err();
    assert!(err.to_string().contains("500"));

    // A fresh annotator asks once, then remembers the failure
    let annotator = annotator(&config);
    assert_eq!(annotator.annotate("horno roto").await, "horno roto");
    assert_eq!(annotator.annotate("horno roto").await, "horno roto");
    assert!(annotator.cache().is_empty());
}

#[tokio::test]
async fn test_slow_service_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "translatedText": "broken oven" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let annotator = annotator(&translation_config(&server, 100));
    assert_eq!(annotator.annotate("horno roto").await, "horno roto");
    assert!(annotator.cache().is_empty());
}

#[tokio::test]
async fn test_batch_against_slow_service_is_bounded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "translatedText": "slow" }))
                .set_delay(Duration::from_secs(5)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let annotator = annotator(&translation_config(&server, 200));
    let phrases = ["horno roto", "queja", "terraza", "queja", "horno roto", "terraza"];

    let started = std::time::Instant::now();
    let out = annotator.annotate_all(phrases).await;

    assert_eq!(out, phrases.to_vec());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_malformed_response_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let annotator = annotator(&translation_config(&server, 2000));
    assert_eq!(annotator.annotate("queja").await, "queja");
}

#[tokio::test]
async fn test_disabled_translation_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = translation_config(&server, 2000);
    config.enabled = false;
    assert_eq!(annotator(&config).annotate("terraza").await, "terraza");
}

// ============================================================================
// Rejected Report Tests
// ============================================================================

#[test]
fn test_missing_total_is_recoverable_parse_error() {
    let text = "Date: 2026-01-10\nVisa: 10\nLunch:\nPax: 4\nWalk in: 0\nNo show: 0\n\
                Dinner:\nPax: 6\nWalk in: 1\nNo show: 0\n";
    let err = parse_report(text).unwrap_err();
    assert_eq!(err, ParseError::MissingRequiredField(RequiredField::TotalSales));

    let err = Error::from(err);
    assert_eq!(err.category(), ErrorCategory::Parsing);
    assert!(err.is_recoverable());
}

#[test]
fn test_invalid_period_is_validation_error() {
    let err = shiftlog::calendar::parse_period_spec("7D").unwrap_err();
    let err = Error::from(err);
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.is_recoverable());
}

#[test]
fn test_missing_service_block_is_incomplete() {
    let err = parse_report("Date: 2026-01-10\nTotal: 100\n").unwrap_err();
    assert_eq!(err, ParseError::IncompleteSection(Service::Lunch));
}

#[test]
fn test_storage_failure_not_recoverable() {
    let err = Error::from(anyhow::anyhow!("disk full"));
    assert_eq!(err.category(), ErrorCategory::Storage);
    assert!(!err.is_recoverable());
}

// ============================================================================
// Guided Capture Tests
// ============================================================================

#[test]
fn test_guided_rejects_bad_number_and_keeps_step() {
    let mut session = GuidedReport::new(day(2026, 1, 10));

    let err = session.handle("lots").unwrap_err();
    assert!(matches!(
        err,
        GuidedError::InvalidNumber {
            step: GuidedStep::TotalSales,
            ..
        }
    ));
    assert_eq!(session.state(), &GuidedState::Collecting(GuidedStep::TotalSales));

    session.handle("1.200,50").unwrap();
    assert_eq!(session.state(), &GuidedState::Collecting(GuidedStep::Visa));
}

#[test]
fn test_guided_refuses_input_after_cancel() {
    let mut session = GuidedReport::new(day(2026, 1, 10));
    session.handle("cancel").unwrap();
    assert_eq!(session.state(), &GuidedState::Cancelled);

    let err = session.handle("100").unwrap_err();
    assert!(matches!(err, GuidedError::Finished));
    assert!(!Error::from(err).is_recoverable());
}
