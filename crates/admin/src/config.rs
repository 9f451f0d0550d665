//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `ADMIN_USERNAME` - Username accepted by `/auth/login`
//! - `ADMIN_PASSWORD` - Password accepted by `/auth/login` (high entropy)
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Shopify Admin API access token (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin API (default: `http://{host}:{port}`)
//! - `SHOPIFY_API_URL` - Admin API origin (default: `https://{SHOPIFY_STORE}`)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SYNC_PAGE_SIZE` - Records per page, 1-250 (default: 50)
//! - `SYNC_MAX_ATTEMPTS` - Fetch attempts per page for retryable errors (default: 3)
//! - `SYNC_INITIAL_BACKOFF_MS` - First retry delay, doubled per attempt (default: 1000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2026-01";

/// Shopify rejects `first` values above 250.
pub const MAX_PAGE_SIZE: i64 = 250;
const DEFAULT_PAGE_SIZE: i64 = 50;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
///
/// Raised at startup, before any synchronization begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Credentials accepted by the login route
    pub credentials: AdminCredentials,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Synchronization tuning
    pub sync: SyncConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// API origin; requests go to `{api_url}/admin/api/{api_version}/graphql.json`
    pub api_url: Url,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store", &self.store)
            .field("api_url", &self.api_url.as_str())
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Admin login credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Synchronization tuning shared by the HTTP server and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Records requested per page (1-250).
    pub page_size: i64,
    /// Attempts per page for rate-limit and network errors.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub initial_backoff: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env()?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env("ADMIN_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", SocketAddr::new(host, port)));
        let session_secret = get_validated_secret("ADMIN_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "ADMIN_SESSION_SECRET")?;

        let credentials = AdminCredentials::from_env()?;
        let shopify = ShopifyAdminConfig::from_env()?;
        let sync = SyncConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            credentials,
            shopify,
            sync,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopifyAdminConfig {
    /// Load the Shopify Admin API settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store or token is missing, the token looks
    /// like a placeholder, or `SHOPIFY_API_URL` is not an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env("SHOPIFY_STORE")?;
        let api_url = get_optional_env("SHOPIFY_API_URL")
            .unwrap_or_else(|| format!("https://{store}"));

        Ok(Self {
            api_url: parse_api_url(&api_url)?,
            store,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: get_validated_secret("SHOPIFY_ACCESS_TOKEN")?,
        })
    }

    /// Full GraphQL endpoint for the configured API version.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "{}/admin/api/{}/graphql.json",
            self.api_url.as_str().trim_end_matches('/'),
            self.api_version
        )
    }
}

impl AdminCredentials {
    fn from_env() -> Result<Self, ConfigError> {
        let username = get_required_env("ADMIN_USERNAME")?;
        if username.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_USERNAME".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            username,
            password: get_validated_secret("ADMIN_PASSWORD")?,
        })
    }
}

impl SyncConfig {
    /// Load synchronization tuning, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparsable or out-of-range values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let page_size = parse_env_or("SYNC_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidEnvVar(
                "SYNC_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"),
            ));
        }

        let max_attempts = parse_env_or("SYNC_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SYNC_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let backoff_ms = parse_env_or("SYNC_INITIAL_BACKOFF_MS", DEFAULT_INITIAL_BACKOFF_MS)?;

        Ok(Self {
            page_size,
            max_attempts,
            initial_backoff: Duration::from_millis(backoff_ms),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var("ADMIN_DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar("ADMIN_DATABASE_URL".to_string()))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, using `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse and validate the Admin API origin.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPIFY_API_URL".to_string(),
            format!("must be an absolute http(s) URL (got {raw})"),
        ));
    }
    Ok(url)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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

    // Real tokens and generated passwords have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopify_config() -> ShopifyAdminConfig {
        ShopifyAdminConfig {
            store: "deck-shop.myshopify.com".to_string(),
            api_url: Url::parse("https://deck-shop.myshopify.com").unwrap(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: SecretString::from("shpat_super_private_token"),
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-access-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_parse_api_url_rejects_relative() {
        assert!(parse_api_url("/admin").is_err());
        assert!(parse_api_url("ftp://shop.example.com").is_err());
        assert!(parse_api_url("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn test_graphql_endpoint() {
        let config = shopify_config();
        assert_eq!(
            config.graphql_endpoint(),
            "https://deck-shop.myshopify.com/admin/api/2026-01/graphql.json"
        );
    }

    #[test]
    fn test_graphql_endpoint_with_path_prefix() {
        let mut config = shopify_config();
        config.api_url = Url::parse("http://localhost:9000/mock/").unwrap();
        assert_eq!(
            config.graphql_endpoint(),
            "http://localhost:9000/mock/admin/api/2026-01/graphql.json"
        );
    }

    #[test]
    fn test_sync_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_shopify_admin_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", shopify_config());

        assert!(debug_output.contains("deck-shop.myshopify.com"));
        assert!(debug_output.contains("2026-01"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_private_token"));
    }

    #[test]
    fn test_admin_credentials_debug_redacts_password() {
        let creds = AdminCredentials {
            username: "shopkeeper".to_string(),
            password: SecretString::from("kickflip-heelflip-tre"),
        };
        let debug_output = format!("{creds:?}");
        assert!(debug_output.contains("shopkeeper"));
        assert!(!debug_output.contains("kickflip"));
    }
}
