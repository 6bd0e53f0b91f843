use crate::application::ServiceConnector;
use crate::domain::{ConnectorError, ServiceConfig, ServiceType};

/// Builds connectors without registering them anywhere.
pub trait ConnectorBuilder: Send + Sync {
    fn build(&self, service: ServiceType, config: &ServiceConfig) -> Result<ServiceConnector, ConnectorError>;
}
