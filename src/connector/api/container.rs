use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::TestConnectionUseCase;
use crate::connector::factory::{resolve_config_path, ConnectorFactory, ProviderCatalog};

#[derive(Default)]
pub struct ContainerConfig {
    /// Service configuration file. Falls back to `$DOCCONNECT_CONFIG`, then
    /// `config/service_conf.toml`.
    pub config_path: Option<PathBuf>,
    /// Providers to offer instead of the built-in catalog.
    pub catalog: Option<ProviderCatalog>,
}

/// Composition root: owns the connector factory and hands it to use cases.
pub struct Container {
    factory: Arc<ConnectorFactory>,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        let path = resolve_config_path(config.config_path.as_deref());
        debug!("Using service configuration at {}", path.display());

        let catalog = config.catalog.unwrap_or_else(ProviderCatalog::builtin);
        Self::with_factory(Arc::new(ConnectorFactory::with_catalog(path, catalog)))
    }

    pub fn with_factory(factory: Arc<ConnectorFactory>) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &ConnectorFactory {
        &self.factory
    }

    pub fn test_connection_use_case(&self) -> TestConnectionUseCase {
        TestConnectionUseCase::new(self.factory.clone())
    }
}
