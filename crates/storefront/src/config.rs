//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target a store API running locally.
//!
//! - `FOLIO_API_BASE_URL` - Store API base URL (default: `http://localhost:5000/api`)
//! - `FOLIO_HOST` - Bind address (default: 127.0.0.1)
//! - `FOLIO_PORT` - Listen port (default: 3000)
//! - `FOLIO_DATA_DIR` - Durable client storage directory (default: `.folio`)
//! - `FOLIO_STATIC_DIR` - Stylesheet and asset directory (default: `crates/storefront/static`)
//! - `FOLIO_CURRENCY` - Display currency: BRL, USD or EUR (default: BRL)
//! - `FOLIO_REQUEST_TIMEOUT_SECS` - Store API request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use folio_core::CurrencyCode;
use thiserror::Error;
use url::Url;

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
    /// Base URL of the store API, always ending in `/`
    pub api_base_url: Url,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory backing durable client storage
    pub data_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Currency used when formatting prices
    pub currency: CurrencyCode,
    /// Timeout applied to every store API request
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: String,
}

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_DIR: &str = ".folio";
const DEFAULT_STATIC_DIR: &str = "crates/storefront/static";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that cannot be
    /// parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that cannot be
    /// parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = parse_base_url(
            &get("FOLIO_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )
        .map_err(|e| ConfigError::InvalidEnvVar("FOLIO_API_BASE_URL".to_string(), e))?;

        let host = get("FOLIO_HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .trim()
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FOLIO_HOST".to_string(), e.to_string()))?;
        let port = parse_or("FOLIO_PORT", get("FOLIO_PORT"), DEFAULT_PORT)?;
        let currency = parse_or("FOLIO_CURRENCY", get("FOLIO_CURRENCY"), CurrencyCode::default())?;
        let timeout_secs = parse_or(
            "FOLIO_REQUEST_TIMEOUT_SECS",
            get("FOLIO_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FOLIO_REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            host,
            port,
            data_dir: PathBuf::from(get("FOLIO_DATA_DIR").as_deref().unwrap_or(DEFAULT_DATA_DIR)),
            static_dir: PathBuf::from(
                get("FOLIO_STATIC_DIR")
                    .as_deref()
                    .unwrap_or(DEFAULT_STATIC_DIR),
            ),
            currency,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        })
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

/// Parse the API base URL, normalising it to end in `/` so relative endpoint
/// paths join underneath it instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/api/");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.currency, CurrencyCode::BRL);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let config = load(&[("FOLIO_API_BASE_URL", "https://store.test/api")]).unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://store.test/api/");
        assert_eq!(
            config.api_base_url.join("produtos").unwrap().as_str(),
            "https://store.test/api/produtos"
        );
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        for (key, value) in [
            ("FOLIO_PORT", "http"),
            ("FOLIO_HOST", "localhost:80"),
            ("FOLIO_API_BASE_URL", "ftp://store.test"),
            ("FOLIO_CURRENCY", "XYZ"),
            ("FOLIO_REQUEST_TIMEOUT_SECS", "0"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("FOLIO_PORT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }
}
