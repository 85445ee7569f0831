//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPCART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOPCART_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPCART_PORT` - Listen port (default: 3000)
//! - `SHOPCART_BASE_URL` - Public URL (default: `http://localhost:3000`); `https://`
//!   turns on secure session cookies
//! - `SHOPCART_ORDER_STATUS_POLICY` - `open` (default) or `strict`
//! - `SHOPCART_TRUSTED_PROXY` - `true` when a reverse proxy sets the client IP
//!   headers (default: false; rate limits then key on the peer address)
//! - `SHOPCART_MAX_CARTS` - Most carts held in memory at once (default: 100000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use shopcart_core::StatusPolicy;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TRUSTED_PROXY: &str = "false";
const DEFAULT_MAX_CARTS: &str = "100000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Which order status labels administrators may set
    pub status_policy: StatusPolicy,
    /// Whether `CF-Connecting-IP`/`X-Forwarded-For` identify the client
    pub trust_proxy_headers: bool,
    /// Most carts held in memory at once
    pub max_carts: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("SHOPCART_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPCART_DATABASE_URL".to_owned()))?;

        let host = parse_var(&lookup, "SHOPCART_HOST", DEFAULT_HOST)?;
        let port = parse_var(&lookup, "SHOPCART_PORT", DEFAULT_PORT)?;
        let base_url = lookup("SHOPCART_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        let status_policy = match lookup("SHOPCART_ORDER_STATUS_POLICY") {
            Some(raw) => raw.parse::<StatusPolicy>().map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPCART_ORDER_STATUS_POLICY".to_owned(), e)
            })?,
            None => StatusPolicy::default(),
        };

        let trust_proxy_headers =
            parse_var(&lookup, "SHOPCART_TRUSTED_PROXY", DEFAULT_TRUSTED_PROXY)?;
        let max_carts: u64 = parse_var(&lookup, "SHOPCART_MAX_CARTS", DEFAULT_MAX_CARTS)?;
        if max_carts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPCART_MAX_CARTS".to_owned(),
                "must be at least 1".to_owned(),
            ));
        }

        let sentry_sample_rate = parse_rate(&lookup, "SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_rate(&lookup, "SENTRY_TRACES_SAMPLE_RATE", 0.1)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            status_policy,
            trust_proxy_headers,
            max_carts,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for running against local, non-persistent backends.
    #[must_use]
    pub fn local() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/shopcart"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: DEFAULT_BASE_URL.to_owned(),
            status_policy: StatusPolicy::default(),
            trust_proxy_headers: false,
            max_carts: 100_000,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn uses_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, substituting `default` when it is unset.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .unwrap_or_else(|| default.to_owned())
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f32,
) -> Result<f32, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("{rate} is outside 0.0..=1.0"),
        ));
    }
    Ok(rate)
}
