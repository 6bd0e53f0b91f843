use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{debug, info, warn};

use super::catalog::ProviderCatalog;
use super::config_loader::ConfigDocument;
use crate::application::{
    ChunkingConnector, Connector, ConnectorBuilder, ConnectorSettings, EmbeddingConnector,
    OcrConnector, ServiceConnector,
};
use crate::connector::http::{HttpClient, RetryPolicy};
use crate::domain::{CacheKey, ConnectorError, ServiceConfig, ServiceType};

/// State only touched while holding the factory lock.
#[derive(Default)]
struct FactoryState {
    config: Option<Arc<ConfigDocument>>,
}

/// Resolves `(service, config)` pairs to connector instances, building each
/// distinct configuration once and handing out shared handles afterwards.
///
/// Lookups take a read lock on the registry. Construction, config loading
/// and reload are serialized by the factory lock, and the registry is
/// re-checked under it so two racing callers never build the same key twice.
pub struct ConnectorFactory {
    catalog: ProviderCatalog,
    config_path: PathBuf,
    backoff: RetryPolicy,
    registry: RwLock<HashMap<CacheKey, ServiceConnector>>,
    state: Mutex<FactoryState>,
}

impl ConnectorFactory {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self::with_catalog(config_path, ProviderCatalog::builtin())
    }

    pub fn with_catalog(config_path: impl Into<PathBuf>, catalog: ProviderCatalog) -> Self {
        Self {
            catalog,
            config_path: config_path.into(),
            backoff: RetryPolicy::default(),
            registry: RwLock::new(HashMap::new()),
            state: Mutex::new(FactoryState::default()),
        }
    }

    /// Backoff delays for connectors built from now on. The attempt count
    /// still comes from each connector's `max_retries`.
    pub fn with_backoff(mut self, backoff: RetryPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Return the connector for `service`, building it on first use.
    ///
    /// With an explicit `config` the instance is keyed by the config's
    /// content; without one it is built from the config file and keyed as
    /// the service's configured connector until [`reload_config`](Self::reload_config).
    /// Failed constructions are never cached.
    pub fn get_connector(
        &self,
        service: ServiceType,
        config: Option<&ServiceConfig>,
    ) -> Result<ServiceConnector, ConnectorError> {
        let key = match config {
            Some(config) => CacheKey::for_config(service, config),
            None => CacheKey::configured(service),
        };

        if let Some(connector) = self.cached(&key) {
            debug!(service = %service, cache_key = %key, "Reusing cached connector");
            return Ok(connector);
        }

        let mut state = self.lock_state();
        if let Some(connector) = self.cached(&key) {
            return Ok(connector);
        }

        let resolved = match config {
            Some(config) => config.clone(),
            None => Self::document(&mut state, &self.config_path).service(service),
        };

        let connector = self.build_uncached(service, &resolved).map_err(|e| {
            warn!(service = %service, cache_key = %key, "Failed to create connector: {}", e);
            e
        })?;

        self.write_registry().insert(key.clone(), connector.clone());
        info!(
            service = %service,
            provider = connector.provider_name(),
            cache_key = %key,
            "Created connector"
        );
        Ok(connector)
    }

    pub fn ocr(&self, config: Option<&ServiceConfig>) -> Result<Arc<OcrConnector>, ConnectorError> {
        self.get_connector(ServiceType::Ocr, config)?.into_ocr()
    }

    pub fn chunking(&self, config: Option<&ServiceConfig>) -> Result<Arc<ChunkingConnector>, ConnectorError> {
        self.get_connector(ServiceType::Chunking, config)?.into_chunking()
    }

    pub fn embedding(&self, config: Option<&ServiceConfig>) -> Result<Arc<EmbeddingConnector>, ConnectorError> {
        self.get_connector(ServiceType::Embedding, config)?.into_embedding()
    }

    /// Build a connector without touching the registry.
    pub fn build_uncached(
        &self,
        service: ServiceType,
        config: &ServiceConfig,
    ) -> Result<ServiceConnector, ConnectorError> {
        let settings = ConnectorSettings::from_config(config.clone())?;
        let provider_settings = config.provider_settings();
        let name = settings.provider().to_string();

        let mut policy = self.backoff.clone();
        policy.max_attempts = settings.max_retries().max(1);
        let http = HttpClient::with_policy(settings.timeout(), policy)?;

        let connector = match service {
            ServiceType::Ocr => {
                let provider = (self.catalog.ocr(&name)?)(&provider_settings, http)
                    .map_err(|e| construction_failed(service, &name, e))?;
                ServiceConnector::from(Arc::new(Connector::new(service, settings, provider)))
            }
            ServiceType::Chunking => {
                let provider = (self.catalog.chunking(&name)?)(&provider_settings, http)
                    .map_err(|e| construction_failed(service, &name, e))?;
                ServiceConnector::from(Arc::new(Connector::new(service, settings, provider)))
            }
            ServiceType::Embedding => {
                let provider = (self.catalog.embedding(&name)?)(&provider_settings, http)
                    .map_err(|e| construction_failed(service, &name, e))?;
                ServiceConnector::from(Arc::new(Connector::new(service, settings, provider)))
            }
        };
        Ok(connector)
    }

    /// The service's section of the config document, loading the document
    /// on first use.
    pub fn load_config(&self, service: ServiceType) -> ServiceConfig {
        let mut state = self.lock_state();
        Self::document(&mut state, &self.config_path).service(service)
    }

    /// Drop the cached config document and every cached connector.
    pub fn reload_config(&self) {
        let mut state = self.lock_state();
        state.config = None;
        let dropped = {
            let mut registry = self.write_registry();
            let count = registry.len();
            registry.clear();
            count
        };
        info!(dropped, "Reloaded connector configuration");
    }

    /// Drop every cached connector but keep the config document.
    pub fn clear_instances(&self) {
        let _state = self.lock_state();
        self.write_registry().clear();
        debug!("Cleared connector instances");
    }

    pub fn instance_count(&self) -> usize {
        self.read_registry().len()
    }

    fn cached(&self, key: &CacheKey) -> Option<ServiceConnector> {
        self.read_registry().get(key).cloned()
    }

    fn document(state: &mut FactoryState, path: &Path) -> Arc<ConfigDocument> {
        state
            .config
            .get_or_insert_with(|| {
                let doc = ConfigDocument::load(path);
                info!(origin = %doc.origin(), "Service configuration loaded");
                Arc::new(doc)
            })
            .clone()
    }

    // A panic while holding one of these locks cannot leave the maps
    // half-updated, so poisoning is ignored.
    fn lock_state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, HashMap<CacheKey, ServiceConnector>> {
        self.registry.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_registry(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<CacheKey, ServiceConnector>> {
        self.registry.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConnectorBuilder for ConnectorFactory {
    fn build(&self, service: ServiceType, config: &ServiceConfig) -> Result<ServiceConnector, ConnectorError> {
        self.build_uncached(service, config)
    }
}

fn construction_failed(service: ServiceType, provider: &str, err: ConnectorError) -> ConnectorError {
    match err {
        ConnectorError::ProviderNotFound(_) | ConnectorError::Configuration(_) => err,
        other => ConnectorError::configuration(format!(
            "failed to initialize {} provider {}: {}",
            service, provider, other
        )),
    }
}
