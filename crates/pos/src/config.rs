//! POS configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POS_API_BASE_URL` - Base URL of the inventory/sales service (e.g., `http://localhost:8000`)
//! - `POS_CASHIER_ID` - User id recorded as the cashier on every sale
//!
//! ## Optional
//! - `POS_SESSION_COOKIE` - Session cookie forwarded to the API (`name=value`)
//! - `POS_DATA_DIR` - Directory for persisted client state (default: .pos)
//! - `POS_CATALOG_PAGE_SIZE` - Products per catalog page (default: 100)
//! - `POS_HTTP_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `POS_CURRENCY` - ISO 4217 code used for display (default: PHP)
//! - `POS_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use shoe_pos_core::{CurrencyCode, UserId};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format for the CLI subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// POS client configuration.
#[derive(Debug, Clone)]
pub struct PosConfig {
    /// REST API connection settings
    pub api: ApiConfig,
    /// Cashier recorded on sales
    pub cashier_id: UserId,
    /// Directory holding the persisted key-value store
    pub data_dir: PathBuf,
    /// Products requested per catalog page
    pub catalog_page_size: u32,
    /// Currency used for display
    pub currency: CurrencyCode,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Inventory/sales REST API configuration.
///
/// Implements `Debug` manually to redact the session cookie.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are joined onto
    pub base_url: Url,
    /// Session cookie forwarded on every request
    pub session_cookie: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for an API at `base_url` with no session and the default timeout.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            session_cookie: None,
            timeout: Duration::from_secs(30),
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(&get_required_env("POS_API_BASE_URL")?)?;
        let session_cookie = get_optional_env("POS_SESSION_COOKIE")
            .map(|value| {
                validate_secret_strength(&value, "POS_SESSION_COOKIE")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;
        let timeout_secs = parse_env_or_default::<u64>("POS_HTTP_TIMEOUT_SECS", "30")?;

        Ok(Self {
            base_url,
            session_cookie,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The session cookie value, if configured.
    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        self.session_cookie.as_ref().map(|c| c.expose_secret())
    }
}

impl PosConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the session cookie fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let cashier_id = get_required_env("POS_CASHIER_ID")?
            .parse::<UserId>()
            .map_err(|e| ConfigError::InvalidEnvVar("POS_CASHIER_ID".to_string(), e.to_string()))?;
        let data_dir = PathBuf::from(get_env_or_default("POS_DATA_DIR", ".pos"));
        let catalog_page_size = parse_env_or_default::<u32>("POS_CATALOG_PAGE_SIZE", "100")?;
        if catalog_page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "POS_CATALOG_PAGE_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let currency = parse_env_or_default::<CurrencyCode>("POS_CURRENCY", "PHP")?;
        let log_format = parse_log_format(&get_env_or_default("POS_LOG_FORMAT", "text"))?;

        Ok(Self {
            api,
            cashier_id,
            data_dir,
            catalog_page_size,
            currency,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Path of the file-backed key-value store.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the API base URL, ensuring it can have paths joined onto it.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("POS_API_BASE_URL".to_string(), msg);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("must be an http(s) URL".to_string()));
    }
    // A trailing slash keeps `Url::join` from dropping the last path segment
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "text" | "" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "POS_LOG_FORMAT".to_string(),
            format!("expected `text` or `json`, got `{other}`"),
        )),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the cookie from an authenticated session."
            ),
        ));
    }

    Ok(())
}
