//! Core values, records, match criteria, and entity identifiers for Trellis.
//!
//! This crate provides:
//! - [`Value`] - The closed value type stored as attributes and carried by events
//! - [`Record`] - Structured values with shallow merge and subset matching
//! - [`Criteria`] - Match predicates used by attribute lookups and queries
//! - [`EntityId`] - Opaque entity identifiers
//! - [`Error`] - Error types with handler context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod criteria;
pub mod entity;
pub mod error;
pub mod record;
pub mod value;

pub use criteria::Criteria;
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind};
pub use record::Record;
pub use value::Value;

/// Result type alias using the Trellis error type.
pub type Result<T> = std::result::Result<T, Error>;
