//! Connector factory: provider catalog, layered configuration and the
//! instance registry.

mod catalog;
mod config_loader;
pub mod defaults;
#[allow(clippy::module_inception)]
mod factory;

pub use catalog::*;
pub use config_loader::*;
pub use factory::*;
