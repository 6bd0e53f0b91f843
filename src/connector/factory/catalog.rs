use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::{ChunkingProvider, EmbeddingProvider, OcrProvider};
use crate::connector::adapter::{
    HuggingFaceEmbedding, InternalChunker, MockEmbedding, OllamaEmbedding, OpenAiEmbedding,
    TesseractOcr,
};
use crate::connector::http::HttpClient;
use crate::domain::{ConnectorError, ProviderSettings, ServiceType};

/// Builds a provider from its settings section and the connector's HTTP client.
pub type ProviderConstructor<P> =
    Arc<dyn Fn(&ProviderSettings, HttpClient) -> Result<Box<P>, ConnectorError> + Send + Sync>;

pub type OcrConstructor = ProviderConstructor<dyn OcrProvider>;
pub type ChunkingConstructor = ProviderConstructor<dyn ChunkingProvider>;
pub type EmbeddingConstructor = ProviderConstructor<dyn EmbeddingProvider>;

/// Registration table of provider constructors, keyed by lowercase provider
/// name, one table per service type.
#[derive(Clone, Default)]
pub struct ProviderCatalog {
    ocr: BTreeMap<String, OcrConstructor>,
    chunking: BTreeMap<String, ChunkingConstructor>,
    embedding: BTreeMap<String, EmbeddingConstructor>,
}

impl ProviderCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every provider shipped with the crate.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();

        catalog.register_ocr("tesseract", |settings, http| {
            Ok(Box::new(TesseractOcr::new(settings, http)?))
        });

        catalog.register_chunking("internal", |settings, _http| {
            Ok(Box::new(InternalChunker::from_settings(settings)?))
        });

        catalog.register_embedding("huggingface", |settings, http| {
            Ok(Box::new(HuggingFaceEmbedding::new(settings, http)?))
        });
        catalog.register_embedding("ollama", |settings, http| {
            Ok(Box::new(OllamaEmbedding::new(settings, http)?))
        });
        catalog.register_embedding("openai", |settings, http| {
            Ok(Box::new(OpenAiEmbedding::new(settings, http)?))
        });
        catalog.register_embedding("mock", |settings, _http| {
            Ok(Box::new(MockEmbedding::from_settings(settings)?))
        });

        catalog
    }

    pub fn register_ocr<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ProviderSettings, HttpClient) -> Result<Box<dyn OcrProvider>, ConnectorError> + Send + Sync + 'static,
    {
        self.ocr.insert(name.to_lowercase(), Arc::new(constructor));
        self
    }

    pub fn register_chunking<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ProviderSettings, HttpClient) -> Result<Box<dyn ChunkingProvider>, ConnectorError>
            + Send
            + Sync
            + 'static,
    {
        self.chunking.insert(name.to_lowercase(), Arc::new(constructor));
        self
    }

    pub fn register_embedding<F>(&mut self, name: &str, constructor: F) -> &mut Self
    where
        F: Fn(&ProviderSettings, HttpClient) -> Result<Box<dyn EmbeddingProvider>, ConnectorError>
            + Send
            + Sync
            + 'static,
    {
        self.embedding.insert(name.to_lowercase(), Arc::new(constructor));
        self
    }

    pub fn ocr(&self, name: &str) -> Result<&OcrConstructor, ConnectorError> {
        self.ocr
            .get(name)
            .ok_or_else(|| self.not_found(ServiceType::Ocr, name))
    }

    pub fn chunking(&self, name: &str) -> Result<&ChunkingConstructor, ConnectorError> {
        self.chunking
            .get(name)
            .ok_or_else(|| self.not_found(ServiceType::Chunking, name))
    }

    pub fn embedding(&self, name: &str) -> Result<&EmbeddingConstructor, ConnectorError> {
        self.embedding
            .get(name)
            .ok_or_else(|| self.not_found(ServiceType::Embedding, name))
    }

    /// Registered provider names for a service, sorted.
    pub fn providers(&self, service: ServiceType) -> Vec<&str> {
        match service {
            ServiceType::Ocr => self.ocr.keys().map(String::as_str).collect(),
            ServiceType::Chunking => self.chunking.keys().map(String::as_str).collect(),
            ServiceType::Embedding => self.embedding.keys().map(String::as_str).collect(),
        }
    }

    fn not_found(&self, service: ServiceType, name: &str) -> ConnectorError {
        ConnectorError::provider_not_found(format!(
            "Unknown {} provider: {}. Available: {}",
            service,
            name,
            self.providers(service).join(", ")
        ))
    }
}
