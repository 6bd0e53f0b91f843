mod chunking_provider;
mod connector_builder;
mod embedding_provider;
mod ocr_provider;
mod provider;

pub use chunking_provider::*;
pub use connector_builder::*;
pub use embedding_provider::*;
pub use ocr_provider::*;
pub use provider::*;
