//! Client Configuration
//!
//! Construction-time settings for the ip-api.com client: optional API
//! key, response language, request timeout, and base endpoint.

use crate::error::{IpApiError, Result};
use std::time::Duration;

/// Languages supported by ip-api.com for localized location names
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "de", "es", "pt-BR", "fr", "ja", "zh-CN", "ru"];

/// Base URL for the free tier (HTTP only)
pub const FREE_BASE_URL: &str = "http://ip-api.com";

/// Base URL for the pro tier (HTTPS, unlocked by an API key)
pub const PRO_BASE_URL: &str = "https://pro.ip-api.com";

/// Environment variable checked by [`ClientConfig::from_env`]
pub const API_KEY_ENV: &str = "IP_API_KEY";

/// Immutable client configuration, fixed at construction
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Optional API key for pro-tier access
    pub api_key: Option<String>,

    /// Language code for localized fields; must be one of
    /// [`SUPPORTED_LANGUAGES`]
    pub lang: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Override for the remote endpoint; when unset the tier decides
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            lang: "en".to_string(),
            timeout: Duration::from_secs(10),
            base_url: None,
        }
    }
}

impl ClientConfig {
    /// Create a default configuration (free tier, English, 10 s timeout)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with an API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Create a configuration, picking up the API key from the
    /// `IP_API_KEY` environment variable (reads `.env` if present)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            ..Self::default()
        }
    }

    /// Set the response language
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the client at a different endpoint (testing, proxies)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_LANGUAGES.contains(&self.lang.as_str()) {
            return Err(IpApiError::Config(format!(
                "unsupported language '{}', expected one of: {}",
                self.lang,
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }
        Ok(())
    }

    /// Whether this configuration uses the pro tier
    pub fn is_pro_tier(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get the effective base URL: explicit override first, otherwise
    /// the tier decides (pro tier gets HTTPS)
    pub fn effective_base_url(&self) -> &str {
        if let Some(url) = &self.base_url {
            return url;
        }
        if self.is_pro_tier() {
            PRO_BASE_URL
        } else {
            FREE_BASE_URL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::new();
        assert!(config.api_key.is_none());
        assert_eq!(config.lang, "en");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_supported_language() {
        let config = ClientConfig::new().lang("de");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_language() {
        let config = ClientConfig::new().lang("xx");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, IpApiError::Config(_)));
        assert!(err.to_string().contains("xx"));
    }

    #[test]
    fn test_tier_base_url() {
        assert_eq!(ClientConfig::new().effective_base_url(), FREE_BASE_URL);
        assert_eq!(
            ClientConfig::with_api_key("secret").effective_base_url(),
            PRO_BASE_URL
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = ClientConfig::with_api_key("secret").base_url("http://localhost:8080");
        assert_eq!(config.effective_base_url(), "http://localhost:8080");
    }
}
