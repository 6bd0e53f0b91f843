mod cache_key;
mod options;
mod provider_info;
mod service_config;
mod service_type;
mod text_chunk;

pub use cache_key::*;
pub use options::*;
pub use provider_info::*;
pub use service_config::*;
pub use service_type::*;
pub use text_chunk::*;
