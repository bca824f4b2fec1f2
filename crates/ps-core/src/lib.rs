//! ps-core: shared types, IDs, errors, configuration, and MIME tables.
//!
//! This crate is the foundational dependency for the other ps-* crates,
//! providing type-safe identifiers, a unified error type, the supported
//! image MIME mappings, and application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod mime;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use mime::*;
