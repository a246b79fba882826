/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;

use rpytl::app_config::{Config, EngineConfig, EngineKind, LogLevel};
use rpytl::errors::AppError;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "id");
    assert_eq!(config.blocking.consecutive_failures, 3);
    assert_eq!(config.blocking.min_attempts, 5);
    assert!((config.blocking.min_success_ratio - 0.2).abs() < f64::EPSILON);
    assert_eq!(config.batch.size, 5);
    assert_eq!(config.batch.delay_secs, 20);
    assert_eq!(config.output.directory, "output");
    assert!(config.output.restore_placeholders);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test engine defaults per kind
#[test]
fn test_engine_defaults_withEachKind_shouldMatchEngineClass() {
    let google = EngineConfig::new(EngineKind::Google);
    assert_eq!(google.timeout_secs(), 20);
    assert_eq!(google.post_call_delay_ms(), 500);
    assert!(google.is_batch_throttled());

    let lingva = EngineConfig::new(EngineKind::Lingva);
    assert_eq!(lingva.resolved_endpoints().len(), 3);
    assert!(!lingva.is_batch_throttled());

    let mut bing = EngineConfig::new(EngineKind::Bing);
    bing.endpoints = vec!["http://localhost:8080/translate".to_string()];
    assert_eq!(bing.resolved_endpoints(), vec!["http://localhost:8080/translate".to_string()]);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Invalid source language
    config.source_language = "not-a-code".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    // Invalid target language
    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "id".to_string();

    // No enabled engine
    for engine in &mut config.engines {
        engine.enabled = false;
    }
    assert!(config.validate().is_err());
    config.engines[0].enabled = true;
    assert!(config.validate().is_ok());

    // Ratio out of range
    config.blocking.min_success_ratio = 1.5;
    assert!(config.validate().is_err());
    config.blocking.min_success_ratio = 0.2;

    // Empty batches
    config.batch.size = 0;
    assert!(config.validate().is_err());
}

/// Validation failures are reported as configuration errors
#[test]
fn test_config_validation_withBadLanguage_shouldReturnConfigError() {
    let mut config = Config::default();
    config.target_language = "not-a-code".to_string();

    let err = config.validate().unwrap_err();
    assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Config(_))));
}

/// Test engine name parsing
#[test]
fn test_engine_kind_from_str_withAliases_shouldParse() {
    assert_eq!(EngineKind::from_str("Google").unwrap(), EngineKind::Google);
    assert_eq!(EngineKind::from_str("trans").unwrap(), EngineKind::Shell);
    assert_eq!(EngineKind::from_str("translate-shell").unwrap(), EngineKind::Shell);
    assert!(EngineKind::from_str("deepl").is_err());
    assert_eq!(EngineKind::Lingva.to_string(), "lingva");
}

/// Test saving and loading the configuration file
#[test]
fn test_save_and_load_withCustomValues_shouldPreserveThem() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("rpytl.json");

    let mut config = Config::default();
    config.target_language = "ms".to_string();
    config.apply_engine_order(&[EngineKind::Lingva, EngineKind::Google]);
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.target_language, "ms");
    let order: Vec<_> = loaded.enabled_engines().map(|e| e.kind).collect();
    assert_eq!(order, vec![EngineKind::Lingva, EngineKind::Google]);
    assert_eq!(loaded.engines.len(), 4);
}

/// Test loading a broken file
#[test]
fn test_load_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "rpytl.json", "{ not json").unwrap();
    assert!(Config::load(&path).is_err());
    assert!(Config::load(temp_dir.path().join("missing.json")).is_err());
}
