//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_NAME` - Store name shown in the page header (default: Vitrina)
//! - `STOREFRONT_BASE_URL` - Public URL of the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_API_URL` - Base URL of the store REST API (default: <http://127.0.0.1:8000>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Store name rendered in the shell page
    pub store_name: String,
    /// Public URL the storefront is served at
    pub base_url: String,
    /// Store backend configuration
    pub backend: BackendConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Store backend (REST API) configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the REST API, always ending with `/`
    pub api_url: Url,
}

impl BackendConfig {
    /// Parse a base URL, normalizing it to end with `/` so endpoint paths
    /// join below it instead of replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the URL is invalid.
    pub fn parse(api_url: &str) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(api_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self { api_url: url })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let store_name = get_env_or_default("STOREFRONT_NAME", "Vitrina");
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", DEFAULT_BASE_URL);
        let backend = BackendConfig::parse(&get_env_or_default(
            "STOREFRONT_API_URL",
            DEFAULT_API_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_API_URL".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            store_name,
            base_url,
            backend,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Configuration for a storefront talking to `backend`, with defaults
    /// for everything else.
    #[must_use]
    pub fn with_backend(backend: BackendConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            store_name: "Vitrina".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            backend,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| parse_rate(key, &raw))
}

fn parse_rate(key: &str, raw: &str) -> Result<f32, ConfigError> {
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_url_gets_trailing_slash() {
        let backend = BackendConfig::parse("http://127.0.0.1:8000").unwrap();
        assert_eq!(backend.api_url.as_str(), "http://127.0.0.1:8000/");

        let backend = BackendConfig::parse("https://shop.example.cl/tienda").unwrap();
        assert_eq!(backend.api_url.as_str(), "https://shop.example.cl/tienda/");

        let backend = BackendConfig::parse("https://shop.example.cl/tienda/").unwrap();
        assert_eq!(backend.api_url.path(), "/tienda/");
    }

    #[test]
    fn test_backend_url_invalid() {
        assert!(BackendConfig::parse("not a url").is_err());
    }

    #[test]
    fn test_parse_rate_bounds() {
        assert!((parse_rate("X", "0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(parse_rate("X", "1.5").is_err());
        assert!(parse_rate("X", "-0.1").is_err());
        assert!(matches!(
            parse_rate("X", "lots"),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "X"
        ));
    }

    #[test]
    fn test_socket_addr() {
        let mut config =
            StorefrontConfig::with_backend(BackendConfig::parse("http://localhost:8000").unwrap());
        config.port = 3100;

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3100);
    }

    #[test]
    fn test_secure_follows_base_url_scheme() {
        let mut config =
            StorefrontConfig::with_backend(BackendConfig::parse("http://localhost:8000").unwrap());
        assert!(!config.is_secure());

        config.base_url = "https://vitrina.example.cl".to_string();
        assert!(config.is_secure());
    }
}
