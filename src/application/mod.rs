//! # Application Layer
//!
//! Provider capability traits, the generic [`Connector`] wrapper that gives
//! every provider the same lifecycle, and the use cases built on top of them.

pub mod interfaces;
pub mod services;
pub mod use_cases;

pub use interfaces::*;
pub use services::*;
pub use use_cases::*;
