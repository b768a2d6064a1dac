//! Client Module
//!
//! HTTP transport and rate limiting functionality.

pub mod http;
pub mod rate_limiter;

pub use http::HttpTransport;
pub use rate_limiter::{RequestBudget, ResponseMetadata, FREE_TIER_LIMIT, RATE_WINDOW};
