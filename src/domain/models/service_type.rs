use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::ConnectorError;

/// The kind of external service a connector talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Ocr,
    Chunking,
    Embedding,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [ServiceType::Ocr, ServiceType::Chunking, ServiceType::Embedding];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Ocr => "ocr",
            ServiceType::Chunking => "chunking",
            ServiceType::Embedding => "embedding",
        }
    }

    /// Key of this service's section in the configuration document.
    pub fn config_section(&self) -> String {
        format!("{}_service", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ocr" => Ok(ServiceType::Ocr),
            "chunking" => Ok(ServiceType::Chunking),
            "embedding" => Ok(ServiceType::Embedding),
            other => Err(ConnectorError::provider_not_found(format!(
                "Unknown service type: {}. Available: ocr, chunking, embedding",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
