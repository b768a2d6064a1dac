//! Query Target Parsing
//!
//! Validates lookup targets before anything touches the network. A
//! target is either an IP literal (IPv4 or IPv6) or a hostname the
//! remote service resolves; DNS-mode operations accept bare domains.

use crate::error::{IpApiError, Result};
use std::net::IpAddr;

/// A validated lookup target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// The caller's own public address; the server infers it
    OwnAddress,

    /// An IPv4 or IPv6 literal
    Addr(IpAddr),

    /// A hostname the remote service resolves
    Host(String),
}

impl QueryTarget {
    /// Parse an optional target string. `None` queries the caller's
    /// own public IP.
    ///
    /// Accepts IP literals and multi-label hostnames. Anything else
    /// (empty string, bare words like "not-an-ip", malformed octets)
    /// fails with [`IpApiError::InvalidIp`] without a network call.
    pub fn parse(target: Option<&str>) -> Result<Self> {
        let Some(target) = target else {
            return Ok(Self::OwnAddress);
        };

        if let Ok(addr) = target.parse::<IpAddr>() {
            return Ok(Self::Addr(addr));
        }

        // Not an IP literal; require a plausible resolvable hostname.
        // A bare label is rejected here since it is far more likely a
        // mistyped address than a resolvable name.
        if is_valid_hostname(target) && target.contains('.') {
            return Ok(Self::Host(target.to_string()));
        }

        Err(IpApiError::InvalidIp(format!(
            "'{}' is not a valid IP address or hostname",
            target
        )))
    }

    /// The path segment appended to the endpoint, if any
    pub fn path_segment(&self) -> Option<String> {
        match self {
            Self::OwnAddress => None,
            Self::Addr(addr) => Some(addr.to_string()),
            Self::Host(host) => Some(host.clone()),
        }
    }
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnAddress => write!(f, "<own address>"),
            Self::Addr(addr) => write!(f, "{}", addr),
            Self::Host(host) => write!(f, "{}", host),
        }
    }
}

/// Validate a domain for DNS-mode lookups.
///
/// Unlike [`QueryTarget::parse`] this accepts single-label names but
/// still rejects empty input and invalid characters.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(IpApiError::InvalidIp("domain cannot be empty".to_string()));
    }
    if !is_valid_hostname(domain) {
        return Err(IpApiError::InvalidIp(format!(
            "'{}' is not a valid domain name",
            domain
        )));
    }
    Ok(())
}

/// Syntactic hostname check per RFC 1123 label rules
fn is_valid_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = name.split('.').collect();

    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return false;
        }
    }

    // An all-numeric final label would make this a malformed IP, not
    // a hostname ("8.8.8.999" must not slip through as a domain).
    if let Some(last) = labels.last() {
        if last.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_own_address() {
        assert_eq!(QueryTarget::parse(None).unwrap(), QueryTarget::OwnAddress);
        assert_eq!(QueryTarget::parse(None).unwrap().path_segment(), None);
    }

    #[test]
    fn test_parse_ipv4() {
        let target = QueryTarget::parse(Some("8.8.8.8")).unwrap();
        assert_eq!(target.path_segment().as_deref(), Some("8.8.8.8"));
    }

    #[test]
    fn test_parse_ipv6() {
        let target = QueryTarget::parse(Some("2001:4860:4860::8888")).unwrap();
        assert!(matches!(target, QueryTarget::Addr(_)));
    }

    #[test]
    fn test_parse_hostname() {
        let target = QueryTarget::parse(Some("dns.google.com")).unwrap();
        assert!(matches!(target, QueryTarget::Host(_)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["not-an-ip", "", "8.8.8.999", "999.999.999.999", "a..b.com", "-bad.com"] {
            let err = QueryTarget::parse(Some(bad)).unwrap_err();
            assert!(matches!(err, IpApiError::InvalidIp(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("google.com").is_ok());
        assert!(validate_domain("localhost").is_ok());
        assert!(validate_domain("").is_err());
        assert!(validate_domain("bad domain.com").is_err());
        assert!(validate_domain("under_score.com").is_err());
    }
}
