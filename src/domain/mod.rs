//! # Domain Layer
//!
//! Service types, connector configuration, cache keys and the error taxonomy.
//! This layer knows nothing about HTTP or about concrete providers.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
