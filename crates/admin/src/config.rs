//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//! - `SALESDESK_DATA_DIR` - Directory holding the slot files (default: `.salesdesk`)
//! - `SALESDESK_PAGE_SIZE` - Rows per page in listings, 1 to 100 (default: 10)
//! - `SALESDESK_LOW_STOCK_THRESHOLD` - Stock below which a product is flagged (default: 10)
//! - `SALESDESK_SEED_ON_INIT` - Seed demo data on `init` (default: true)
//! - `SALESDESK_LOG_FORMAT` - `text` or `json` (default: text)

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".salesdesk";
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got {other:?}")),
        }
    }
}

/// Admin application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Directory holding one file per storage slot
    pub data_dir: PathBuf,
    /// Default rows per page for listings
    pub page_size: u32,
    /// Products with stock below this are flagged on the dashboard
    pub low_stock_threshold: u32,
    /// Whether `init` seeds demo data into empty collections
    pub seed_on_init: bool,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            page_size: DEFAULT_PAGE_SIZE,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            seed_on_init: true,
            log_format: LogFormat::Text,
        }
    }
}

impl AdminConfig {
    /// Load configuration from the process environment, after reading `.env`
    /// if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that does not parse or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AdminConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(get_env_or_default(&lookup, "SALESDESK_DATA_DIR", DEFAULT_DATA_DIR));
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SALESDESK_DATA_DIR".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let page_size: u32 = parse_env_or(&lookup, "SALESDESK_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "SALESDESK_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"),
            ));
        }

        let low_stock_threshold = parse_env_or(
            &lookup,
            "SALESDESK_LOW_STOCK_THRESHOLD",
            DEFAULT_LOW_STOCK_THRESHOLD,
        )?;
        let seed_on_init = parse_env_or(&lookup, "SALESDESK_SEED_ON_INIT", true)?;
        let log_format = parse_env_or(&lookup, "SALESDESK_LOG_FORMAT", LogFormat::Text)?;

        Ok(Self {
            data_dir,
            page_size,
            low_stock_threshold,
            seed_on_init,
            log_format,
        })
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
