mod connector;
mod service_connector;

pub use connector::*;
pub use service_connector::*;
