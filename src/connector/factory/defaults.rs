//! Built-in service configuration, used whenever the config file is missing
//! or unreadable and for services the file does not mention.

use serde_json::{json, Map, Value};

use crate::connector::adapter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_DELIMITER};
use crate::domain::{ServiceConfig, ServiceType};

pub const DEFAULT_OCR_URL: &str = "http://localhost:8081";
pub const DEFAULT_OCR_LANG: &str = "eng+kor";
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8080";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-large-en-v1.5";

pub fn default_service_config(service: ServiceType) -> ServiceConfig {
    let value = match service {
        ServiceType::Ocr => json!({
            "provider": "tesseract",
            "timeout": 30,
            "max_retries": 3,
            "tesseract": {
                "url": DEFAULT_OCR_URL,
                "lang": DEFAULT_OCR_LANG,
                "timeout": 30,
            }
        }),
        ServiceType::Chunking => json!({
            "provider": "internal",
            "timeout": 30,
            "max_retries": 3,
            "internal": {
                "chunk_size": DEFAULT_CHUNK_SIZE,
                "chunk_overlap": DEFAULT_CHUNK_OVERLAP,
                "delimiter": DEFAULT_DELIMITER,
            }
        }),
        ServiceType::Embedding => json!({
            "provider": "huggingface",
            "timeout": 60,
            "max_retries": 3,
            "huggingface": {
                "model_name": DEFAULT_EMBEDDING_MODEL,
                "base_url": DEFAULT_EMBEDDING_URL,
                "device": "cpu",
            }
        }),
    };

    ServiceConfig::from_value(value).unwrap_or_default()
}

/// The whole default document, keyed by `<service>_service`.
pub fn default_document() -> Map<String, Value> {
    ServiceType::ALL
        .iter()
        .map(|service| {
            (
                service.config_section(),
                Value::Object(default_service_config(*service).as_map().clone()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_service_has_a_provider() {
        for service in ServiceType::ALL {
            let config = default_service_config(service);
            assert!(config.provider().is_some(), "{}", service);
            assert!(!config.provider_settings().redacted().is_empty());
        }
    }

    #[test]
    fn test_documented_values() {
        let ocr = default_service_config(ServiceType::Ocr);
        assert_eq!(ocr.provider(), Some("tesseract"));
        assert_eq!(ocr.provider_settings().get_str("url"), Some("http://localhost:8081"));

        let embedding = default_service_config(ServiceType::Embedding);
        assert_eq!(embedding.timeout().unwrap().as_secs(), 60);

        let chunking = default_service_config(ServiceType::Chunking).provider_settings();
        assert_eq!(chunking.i64_or("chunk_size", 0).unwrap(), 512);
        assert_eq!(chunking.i64_or("chunk_overlap", 0).unwrap(), 50);
    }

    #[test]
    fn test_document_sections() {
        let doc = default_document();
        assert!(doc.contains_key("ocr_service"));
        assert!(doc.contains_key("chunking_service"));
        assert!(doc.contains_key("embedding_service"));
    }
}
