use std::env;

use crate::error::AppError;

/// Default goal categories requested when a consultation starts.
pub const DEFAULT_GOAL_CATEGORIES: &[&str] = &["E", "B", "L", "H-1B", "J-1"];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub consultation: ConsultationConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Inference engine API configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
}

/// Consultation session configuration
#[derive(Debug, Clone)]
pub struct ConsultationConfig {
    /// Goal categories sent with every start request.
    pub goal_categories: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    /// Retries for read-only fetches. Mutating calls are sent once.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let engine = EngineConfig {
            base_url: env::var("ENGINE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        };

        let consultation = match env::var("GOAL_CATEGORIES") {
            Ok(raw) => ConsultationConfig::parse(&raw)?,
            Err(_) => ConsultationConfig::default(),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };

        Ok(Config {
            engine,
            consultation,
            logging,
            request,
        })
    }
}

impl ConsultationConfig {
    /// Parse a comma-separated category list. Blank entries are dropped.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let goal_categories: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if goal_categories.is_empty() {
            return Err(AppError::Config {
                message: "GOAL_CATEGORIES must name at least one category".to_string(),
            });
        }

        Ok(Self { goal_categories })
    }
}

impl Default for ConsultationConfig {
    fn default() -> Self {
        Self {
            goal_categories: DEFAULT_GOAL_CATEGORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}
