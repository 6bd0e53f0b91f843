use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sanitized description of a connector's provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Provider settings with every sensitive key removed.
    pub config: Map<String, Value>,
    /// Per-attempt request timeout in seconds.
    pub timeout: f64,
    pub max_retries: u32,
}

/// Outcome of a liveness probe. Never carries an error: failures are `healthy == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            healthy: true,
            latency_ms,
            detail: None,
        }
    }

    pub fn unhealthy(latency_ms: u64, detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency_ms,
            detail: Some(detail.into()),
        }
    }
}
