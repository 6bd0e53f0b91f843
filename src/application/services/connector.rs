use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::application::{ChunkingProvider, EmbeddingProvider, OcrProvider, Provider};
use crate::domain::{
    ChunkingOptions, ConnectorError, EmbeddingOptions, HealthStatus, OcrOptions, ProviderInfo,
    ServiceConfig, ServiceType,
};

/// Settings every connector extracts from its [`ServiceConfig`] before the
/// provider is built.
#[derive(Debug, Clone)]
pub struct ConnectorSettings {
    provider: String,
    timeout: Duration,
    max_retries: u32,
    config: ServiceConfig,
}

impl ConnectorSettings {
    pub fn from_config(config: ServiceConfig) -> Result<Self, ConnectorError> {
        let provider = config
            .provider()
            .map(str::to_lowercase)
            .ok_or_else(|| ConnectorError::configuration("provider is required"))?;
        let timeout = config.timeout()?;
        let max_retries = config.max_retries()?;

        Ok(Self {
            provider,
            timeout,
            max_retries,
            config,
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// A provider wrapped with the lifecycle every service shares: error
/// classification, a total health check and redacted introspection.
pub struct Connector<P: ?Sized> {
    service: ServiceType,
    settings: ConnectorSettings,
    provider: Box<P>,
}

pub type OcrConnector = Connector<dyn OcrProvider>;
pub type ChunkingConnector = Connector<dyn ChunkingProvider>;
pub type EmbeddingConnector = Connector<dyn EmbeddingProvider>;

impl<P: Provider + ?Sized> Connector<P> {
    pub fn new(service: ServiceType, settings: ConnectorSettings, provider: Box<P>) -> Self {
        Self {
            service,
            settings,
            provider,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        self.service
    }

    pub fn provider_name(&self) -> &str {
        self.settings.provider()
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout()
    }

    pub fn max_retries(&self) -> u32 {
        self.settings.max_retries()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run the provider's probe, reporting a probe that could not run as
    /// [`ConnectorError::HealthCheck`].
    pub async fn try_health_check(&self) -> Result<bool, ConnectorError> {
        match AssertUnwindSafe(self.provider.health_check())
            .catch_unwind()
            .await
        {
            Ok(Ok(healthy)) => Ok(healthy),
            Ok(Err(e)) => Err(ConnectorError::health_check(format!("{:#}", e))),
            Err(panic) => Err(ConnectorError::health_check(format!(
                "probe panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }

    /// Liveness probe. Never fails: any error or panic becomes `false`.
    pub async fn health_check(&self) -> bool {
        self.check_health().await.healthy
    }

    pub async fn check_health(&self) -> HealthStatus {
        let start = Instant::now();
        let outcome = self.try_health_check().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(true) => {
                debug!(service = %self.service, provider = self.provider_name(), latency_ms, "health check passed");
                HealthStatus::healthy(latency_ms)
            }
            Ok(false) => {
                warn!(service = %self.service, provider = self.provider_name(), latency_ms, "health check reported unhealthy");
                HealthStatus::unhealthy(latency_ms, "service reported unhealthy")
            }
            Err(e) => {
                warn!(service = %self.service, provider = self.provider_name(), latency_ms, "health check failed: {}", e);
                HealthStatus::unhealthy(latency_ms, e.to_string())
            }
        }
    }

    pub fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            provider_type: self.settings.provider().to_string(),
            config: self.settings.config().provider_settings().redacted(),
            timeout: self.settings.timeout().as_secs_f64(),
            max_retries: self.settings.max_retries(),
        }
    }

    /// Await a provider call, classifying its error (or panic) into the taxonomy.
    async fn guarded<T, F>(&self, operation: &str, call: F) -> Result<T, ConnectorError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let outcome = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result.map_err(ConnectorError::classify),
            Err(panic) => Err(ConnectorError::processing(format!(
                "{} panicked: {}",
                operation,
                panic_message(panic.as_ref())
            ))),
        };

        if let Err(e) = &outcome {
            warn!(
                service = %self.service,
                provider = self.provider_name(),
                kind = %e.kind(),
                "{} failed: {}",
                operation,
                e
            );
        }
        outcome
    }
}

impl Connector<dyn OcrProvider> {
    /// Extract text from an image.
    pub async fn process(&self, image: &[u8], options: &OcrOptions) -> Result<String, ConnectorError> {
        self.guarded("ocr", self.provider.extract_text(image, options))
            .await
    }
}

impl Connector<dyn ChunkingProvider> {
    /// Split text into ordered chunks.
    pub async fn process(&self, text: &str, options: &ChunkingOptions) -> Result<Vec<String>, ConnectorError> {
        self.guarded("chunking", self.provider.chunk_text(text, options))
            .await
    }
}

impl Connector<dyn EmbeddingProvider> {
    /// Embed texts. On success the result has exactly one vector per input,
    /// in input order. Any blank text fails the whole call with a
    /// `Processing` error, so results never need realigning.
    pub async fn process(
        &self,
        texts: &[String],
        options: &EmbeddingOptions,
    ) -> Result<Vec<Vec<f32>>, ConnectorError> {
        self.guarded("embedding", self.provider.embed(texts, options))
            .await
    }

    pub async fn dimension(&self) -> Result<usize, ConnectorError> {
        self.guarded("dimension lookup", self.provider.dimension())
            .await
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}

impl<P: ?Sized> fmt::Debug for Connector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("service", &self.service)
            .field("provider", &self.settings.provider)
            .field("timeout", &self.settings.timeout)
            .field("max_retries", &self.settings.max_retries)
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
