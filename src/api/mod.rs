//! API Module
//!
//! Field selection, output formats, and response types.

pub mod fields;
pub mod types;

pub use fields::{Fields, AVAILABLE_FIELDS};
pub use types::{BatchQueryItem, LookupResult, OutputFormat};
