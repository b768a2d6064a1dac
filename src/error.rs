//! Error Types
//!
//! Error classification for ip-api.com client operations.
//!
//! Everything the caller got wrong (bad target, bad field name, bad
//! language, exhausted client-side budget) fails before any network
//! call with its own variant. Everything that goes wrong after the
//! request is dispatched (remote-reported failure, transport failure,
//! timeout, undecodable body) is folded into [`IpApiError::Api`].

use std::fmt;
use std::time::Duration;

/// Main error type for ip-api.com client operations
#[derive(Debug)]
pub enum IpApiError {
    /// Invalid construction or call parameters (unsupported language,
    /// unrecognized field name, out-of-range batch size, closed session)
    Config(String),

    /// Caller-supplied IP address or domain is malformed; never sent
    /// over the network
    InvalidIp(String),

    /// Client-side rate-limit budget exhausted; never sent over the
    /// network
    RateLimited {
        /// Request ceiling for the window
        limit: u32,
        /// Window length
        window: Duration,
    },

    /// The exchange itself failed: remote-reported error status,
    /// non-success HTTP status, transport failure, or timeout
    Api(String),
}

impl fmt::Display for IpApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpApiError::Config(msg) => write!(f, "Configuration error: {}", msg),
            IpApiError::InvalidIp(msg) => write!(f, "Invalid query target: {}", msg),
            IpApiError::RateLimited { limit, window } => {
                write!(
                    f,
                    "Rate limit exceeded: {} requests per {} seconds",
                    limit,
                    window.as_secs()
                )
            }
            IpApiError::Api(msg) => write!(f, "API request failed: {}", msg),
        }
    }
}

impl std::error::Error for IpApiError {}

impl From<reqwest::Error> for IpApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IpApiError::Api(format!("request timeout: {}", err))
        } else if err.is_connect() {
            IpApiError::Api(format!("connection failed: {}", err))
        } else if err.is_decode() {
            IpApiError::Api(format!("failed to decode response: {}", err))
        } else {
            IpApiError::Api(err.to_string())
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, IpApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = IpApiError::InvalidIp("not-an-ip".to_string());
        assert!(err.to_string().contains("not-an-ip"));

        let err = IpApiError::RateLimited {
            limit: 45,
            window: Duration::from_secs(60),
        };
        assert!(err.to_string().contains("45"));
        assert!(err.to_string().contains("60"));
    }

    #[test]
    fn test_config_error_display() {
        let err = IpApiError::Config("unsupported language 'xx'".to_string());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
