use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::ConnectorBuilder;
use crate::domain::{ConnectorError, ProviderInfo, ProviderSettings, ServiceConfig, ServiceType};

/// Throwaway connectors get a short timeout and no retries.
pub const TEST_TIMEOUT_SECS: u64 = 10;
pub const TEST_MAX_RETRIES: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    pub response_time_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_info: Option<ProviderInfo>,
}

#[derive(Debug, Error)]
pub enum ConnectionTestError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("Connection test failed unexpectedly: {0}")]
    Unexpected(String),
}

impl ConnectionTestError {
    /// 404 unknown provider, 400 bad configuration, 503 other connector
    /// failures, 500 anything unexpected.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Connector(e) => e.status_code(),
            Self::Unexpected(_) => 500,
        }
    }
}

/// Checks that a provider configuration is valid and its service reachable,
/// without registering the connector anywhere.
pub struct TestConnectionUseCase {
    builder: Arc<dyn ConnectorBuilder>,
}

impl TestConnectionUseCase {
    pub fn new(builder: Arc<dyn ConnectorBuilder>) -> Self {
        Self { builder }
    }

    pub async fn execute(
        &self,
        service: &str,
        provider: &str,
        settings: ProviderSettings,
    ) -> Result<ConnectionReport, ConnectionTestError> {
        let start = Instant::now();
        let service: ServiceType = service.parse()?;

        let config = ServiceConfig::for_provider(provider, settings)
            .with_timeout(TEST_TIMEOUT_SECS)
            .with_max_retries(TEST_MAX_RETRIES);

        let built = panic::catch_unwind(AssertUnwindSafe(|| self.builder.build(service, &config)));
        let connector = match built {
            Ok(Ok(connector)) => connector,
            Ok(Err(e)) => {
                warn!("Connection test for {}/{} rejected: {}", service, provider, e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("Connection test for {}/{} panicked while building the connector", service, provider);
                return Err(ConnectionTestError::Unexpected(format!(
                    "building the {} connector for {} panicked",
                    service, provider
                )));
            }
        };

        let healthy = connector.health_check().await;
        let response_time_secs = start.elapsed().as_secs_f64();

        if healthy {
            info!("Service test passed: {}/{}", service, provider);
            Ok(ConnectionReport {
                success: true,
                message: format!("Successfully connected to {}", provider),
                response_time_secs,
                provider_info: Some(connector.provider_info()),
            })
        } else {
            warn!("Service health check failed: {}/{}", service, provider);
            Ok(ConnectionReport {
                success: false,
                message: format!("Service health check failed for {}", provider),
                response_time_secs,
                provider_info: None,
            })
        }
    }
}
