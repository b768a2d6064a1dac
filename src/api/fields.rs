//! Field Selection
//!
//! The service lets callers restrict which attributes a lookup
//! returns, either by listing field names or by passing the numeric
//! bitmask its query builder generates. Names are validated against
//! the fixed set the service recognizes; bitmasks pass through as-is.

use crate::error::{IpApiError, Result};

/// Every field name recognized by the service
pub const AVAILABLE_FIELDS: &[&str] = &[
    "status",
    "message",
    "continent",
    "continentCode",
    "country",
    "countryCode",
    "region",
    "regionName",
    "city",
    "district",
    "zip",
    "lat",
    "lon",
    "timezone",
    "offset",
    "currency",
    "isp",
    "org",
    "as",
    "asname",
    "reverse",
    "mobile",
    "proxy",
    "hosting",
    "query",
];

/// A field selector for lookup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    /// Explicit field names, validated against [`AVAILABLE_FIELDS`]
    Names(Vec<String>),

    /// Numeric bitmask in the service's encoding, passed through
    Bitmask(u32),
}

impl Fields {
    /// Build a selector from field names
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Render the selector as the `fields` query parameter value.
    ///
    /// Fails with [`IpApiError::Config`] when a name is not one the
    /// service recognizes.
    pub fn to_query_param(&self) -> Result<String> {
        match self {
            Self::Bitmask(mask) => Ok(mask.to_string()),
            Self::Names(names) => {
                let invalid: Vec<&str> = names
                    .iter()
                    .map(String::as_str)
                    .filter(|name| !AVAILABLE_FIELDS.contains(name))
                    .collect();

                if !invalid.is_empty() {
                    return Err(IpApiError::Config(format!(
                        "unrecognized fields: {}",
                        invalid.join(", ")
                    )));
                }

                Ok(names.join(","))
            }
        }
    }
}
