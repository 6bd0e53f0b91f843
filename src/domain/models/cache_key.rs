use std::fmt;

use sha2::{Digest, Sha256};

use super::{ServiceConfig, ServiceType};

const CONFIGURED: &str = "configured";

/// Identifies one connector instance in the factory registry.
///
/// Explicit configurations are keyed by a SHA-256 digest of their canonical
/// (sorted, fully nested) JSON form, so two maps with the same content always
/// share a key regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    service: ServiceType,
    fingerprint: String,
}

impl CacheKey {
    pub fn for_config(service: ServiceType, config: &ServiceConfig) -> Self {
        let digest = Sha256::digest(config.canonical_json().as_bytes());
        let fingerprint = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Self { service, fingerprint }
    }

    /// Key for the connector built from the configuration source.
    pub fn configured(service: ServiceType) -> Self {
        Self {
            service,
            fingerprint: CONFIGURED.to_string(),
        }
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn is_configured(&self) -> bool {
        self.fingerprint == CONFIGURED
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.fingerprint.get(..12).unwrap_or(&self.fingerprint);
        write!(f, "{}:{}", self.service, short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> ServiceConfig {
        ServiceConfig::from_value(value).unwrap()
    }

    #[test]
    fn test_equal_content_equal_key() {
        let a = config(json!({"provider": "tesseract", "timeout": 30, "tesseract": {"lang": "eng"}}));
        let b = config(json!({"tesseract": {"lang": "eng"}, "timeout": 30, "provider": "tesseract"}));
        assert_eq!(
            CacheKey::for_config(ServiceType::Ocr, &a),
            CacheKey::for_config(ServiceType::Ocr, &b)
        );
    }

    #[test]
    fn test_nested_differences_change_key() {
        let a = config(json!({"provider": "tesseract", "tesseract": {"lang": "eng"}}));
        let b = config(json!({"provider": "tesseract", "tesseract": {"lang": "kor"}}));
        assert_ne!(
            CacheKey::for_config(ServiceType::Ocr, &a),
            CacheKey::for_config(ServiceType::Ocr, &b)
        );
    }

    #[test]
    fn test_service_type_partitions_keys() {
        let cfg = config(json!({"provider": "internal"}));
        assert_ne!(
            CacheKey::for_config(ServiceType::Ocr, &cfg),
            CacheKey::for_config(ServiceType::Chunking, &cfg)
        );
        assert_ne!(
            CacheKey::configured(ServiceType::Ocr),
            CacheKey::for_config(ServiceType::Ocr, &cfg)
        );
    }

    #[test]
    fn test_display_is_short() {
        let cfg = config(json!({"provider": "internal"}));
        let key = CacheKey::for_config(ServiceType::Chunking, &cfg);
        let shown = key.to_string();
        assert!(shown.starts_with("chunking:"));
        assert_eq!(shown.len(), "chunking:".len() + 12);
        assert_eq!(CacheKey::configured(ServiceType::Ocr).to_string(), "ocr:configured");
    }
}
