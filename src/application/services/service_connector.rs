use std::sync::Arc;

use crate::domain::{ConnectorError, HealthStatus, ProviderInfo, ServiceType};

use super::{ChunkingConnector, EmbeddingConnector, OcrConnector};

/// A live connector of any service type, as stored in the factory registry.
///
/// Cloning is cheap and keeps pointing at the same connector instance.
#[derive(Debug, Clone)]
pub enum ServiceConnector {
    Ocr(Arc<OcrConnector>),
    Chunking(Arc<ChunkingConnector>),
    Embedding(Arc<EmbeddingConnector>),
}

impl ServiceConnector {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Self::Ocr(_) => ServiceType::Ocr,
            Self::Chunking(_) => ServiceType::Chunking,
            Self::Embedding(_) => ServiceType::Embedding,
        }
    }

    pub fn provider_name(&self) -> &str {
        match self {
            Self::Ocr(c) => c.provider_name(),
            Self::Chunking(c) => c.provider_name(),
            Self::Embedding(c) => c.provider_name(),
        }
    }

    pub async fn health_check(&self) -> bool {
        match self {
            Self::Ocr(c) => c.health_check().await,
            Self::Chunking(c) => c.health_check().await,
            Self::Embedding(c) => c.health_check().await,
        }
    }

    pub async fn check_health(&self) -> HealthStatus {
        match self {
            Self::Ocr(c) => c.check_health().await,
            Self::Chunking(c) => c.check_health().await,
            Self::Embedding(c) => c.check_health().await,
        }
    }

    pub fn provider_info(&self) -> ProviderInfo {
        match self {
            Self::Ocr(c) => c.provider_info(),
            Self::Chunking(c) => c.provider_info(),
            Self::Embedding(c) => c.provider_info(),
        }
    }

    /// True when both handles point at the same connector instance.
    pub fn ptr_eq(&self, other: &ServiceConnector) -> bool {
        match (self, other) {
            (Self::Ocr(a), Self::Ocr(b)) => Arc::ptr_eq(a, b),
            (Self::Chunking(a), Self::Chunking(b)) => Arc::ptr_eq(a, b),
            (Self::Embedding(a), Self::Embedding(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn into_ocr(self) -> Result<Arc<OcrConnector>, ConnectorError> {
        match self {
            Self::Ocr(c) => Ok(c),
            other => Err(other.mismatch(ServiceType::Ocr)),
        }
    }

    pub fn into_chunking(self) -> Result<Arc<ChunkingConnector>, ConnectorError> {
        match self {
            Self::Chunking(c) => Ok(c),
            other => Err(other.mismatch(ServiceType::Chunking)),
        }
    }

    pub fn into_embedding(self) -> Result<Arc<EmbeddingConnector>, ConnectorError> {
        match self {
            Self::Embedding(c) => Ok(c),
            other => Err(other.mismatch(ServiceType::Embedding)),
        }
    }

    fn mismatch(&self, expected: ServiceType) -> ConnectorError {
        ConnectorError::configuration(format!(
            "expected a {} connector, found {}",
            expected,
            self.service_type()
        ))
    }
}

impl From<Arc<OcrConnector>> for ServiceConnector {
    fn from(c: Arc<OcrConnector>) -> Self {
        Self::Ocr(c)
    }
}

impl From<Arc<ChunkingConnector>> for ServiceConnector {
    fn from(c: Arc<ChunkingConnector>) -> Self {
        Self::Chunking(c)
    }
}

impl From<Arc<EmbeddingConnector>> for ServiceConnector {
    fn from(c: Arc<EmbeddingConnector>) -> Self {
        Self::Embedding(c)
    }
}
