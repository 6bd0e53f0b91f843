//! # Connector Layer
//!
//! Everything that talks to the outside world:
//! - `http`: the retrying call primitive shared by remote providers
//! - `adapter`: concrete OCR, chunking and embedding providers
//! - `factory`: provider catalog, layered configuration, instance registry
//! - `api`: composition root and CLI controllers

pub mod adapter;
pub mod api;
pub mod factory;
pub mod http;

pub use adapter::*;
pub use factory::*;
pub use http::*;
