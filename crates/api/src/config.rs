//! Application configuration loaded from environment variables.

use std::time::Duration;

use checkout::{HttpBackendConfig, Locale};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `BACKEND_URL` — storefront backend origin (default: `"http://localhost:5000"`)
/// - `PUBLIC_ORIGIN` — origin gateways send customers back to (default: `"http://localhost:3000"`)
/// - `BACKEND_TOKEN` — bearer token for backend calls (default: unset)
/// - `CHECKOUT_LOCALE` — `en` or `vi` (default: `en`)
/// - `BACKEND_TIMEOUT_SECS` — backend request timeout (default: `30`)
///
/// Unparseable values fall back to their defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub backend_url: String,
    pub public_origin: String,
    pub backend_token: Option<String>,
    pub locale: Locale,
    pub backend_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            backend_url: std::env::var("BACKEND_URL").unwrap_or(defaults.backend_url),
            public_origin: std::env::var("PUBLIC_ORIGIN").unwrap_or(defaults.public_origin),
            backend_token: std::env::var("BACKEND_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            locale: std::env::var("CHECKOUT_LOCALE")
                .ok()
                .and_then(|l| l.parse().ok())
                .unwrap_or(defaults.locale),
            backend_timeout: std::env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.backend_timeout),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the settings for the backend HTTP client.
    pub fn backend(&self) -> HttpBackendConfig {
        HttpBackendConfig {
            base_url: self.backend_url.clone(),
            bearer_token: self.backend_token.clone(),
            timeout: self.backend_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            backend_url: "http://localhost:5000".to_string(),
            public_origin: "http://localhost:3000".to_string(),
            backend_token: None,
            locale: Locale::En,
            backend_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.backend_url, "http://localhost:5000");
        assert_eq!(config.public_origin, "http://localhost:3000");
        assert_eq!(config.backend_token, None);
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.backend_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_backend_settings() {
        let config = Config {
            backend_url: "https://api.shop.test".to_string(),
            backend_token: Some("s3cret".to_string()),
            backend_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        let backend = config.backend();
        assert_eq!(backend.base_url, "https://api.shop.test");
        assert_eq!(backend.bearer_token.as_deref(), Some("s3cret"));
        assert_eq!(backend.timeout, Duration::from_secs(5));
    }
}
