//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use serial_test::serial;
use std::env;
use visa_consult_client::config::{Config, LogFormat, DEFAULT_GOAL_CATEGORIES};
use visa_consult_client::AppError;

#[test]
#[serial]
fn test_config_from_env_defaults() {
    env::remove_var("ENGINE_BASE_URL");
    env::remove_var("GOAL_CATEGORIES");

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.base_url, "http://localhost:8000");
    assert_eq!(
        config.consultation.goal_categories,
        DEFAULT_GOAL_CATEGORIES
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    );
}

#[test]
#[serial]
fn test_config_from_env_custom_base_url() {
    env::set_var("ENGINE_BASE_URL", "http://engine.internal:9000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.base_url, "http://engine.internal:9000");

    env::remove_var("ENGINE_BASE_URL");
}

#[test]
#[serial]
fn test_config_from_env_goal_categories() {
    env::set_var("GOAL_CATEGORIES", " H-1B , ,L ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.consultation.goal_categories, vec!["H-1B", "L"]);

    env::remove_var("GOAL_CATEGORIES");
}

#[test]
#[serial]
fn test_config_from_env_empty_goal_categories_rejected() {
    env::set_var("GOAL_CATEGORIES", " , ");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    env::remove_var("GOAL_CATEGORIES");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_config_from_env_custom_request() {
    env::set_var("REQUEST_TIMEOUT_MS", "60000");
    env::set_var("MAX_RETRIES", "5");
    env::set_var("RETRY_DELAY_MS", "2000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);
    assert_eq!(config.request.max_retries, 5);
    assert_eq!(config.request.retry_delay_ms, 2000);

    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("MAX_RETRIES");
    env::remove_var("RETRY_DELAY_MS");
}

#[test]
#[serial]
fn test_config_from_env_invalid_numbers_fall_back() {
    env::set_var("REQUEST_TIMEOUT_MS", "soon");
    env::set_var("MAX_RETRIES", "-1");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.request.max_retries, 3);

    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("MAX_RETRIES");
}
