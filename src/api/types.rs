//! API Types
//!
//! Response and wire types for lookup operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output format for single lookups.
///
/// Only JSON is parsed by the client; the other formats are returned
/// to the caller as opaque text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON, parsed into a [`LookupResult`]
    #[default]
    Json,

    /// XML, returned as text
    Xml,

    /// CSV, returned as text
    Csv,

    /// Newline-separated values, returned as text
    Line,
}

impl OutputFormat {
    /// The path segment the service uses for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Line => "line",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a batch request body
#[derive(Debug, Clone, Serialize)]
pub struct BatchQueryItem {
    /// The IP address or domain to look up
    pub query: String,

    /// Rendered `fields` selector, when restricting output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,

    /// Language code, when not the service default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// A single lookup response: field name to value, as returned by the
/// service and optionally restricted to the requested field subset.
///
/// Kept as a JSON map rather than a fixed struct because the key set
/// depends entirely on the caller's field selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupResult(pub serde_json::Map<String, Value>);

impl LookupResult {
    /// Get a raw field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get a field value as a string slice
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// The `status` field ("success" or "fail"), when present
    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    /// Whether the service reported this entry as successful.
    ///
    /// A missing `status` counts as success: the service omits it
    /// when the caller's field selection excludes it.
    pub fn is_success(&self) -> bool {
        self.status().map_or(true, |s| s == "success")
    }

    /// The remote-provided failure reason, when present
    pub fn message(&self) -> Option<&str> {
        self.get_str("message")
    }

    /// The resolved query address, when present
    pub fn query(&self) -> Option<&str> {
        self.get_str("query")
    }

    /// Country name, when present
    pub fn country(&self) -> Option<&str> {
        self.get_str("country")
    }

    /// City name, when present
    pub fn city(&self) -> Option<&str> {
        self.get_str("city")
    }

    /// Number of fields in this result
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the result carries no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over field names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
