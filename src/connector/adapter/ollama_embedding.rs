use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::embedding_input::{batch_size, parse_vector, prepare_texts, DEFAULT_BATCH_SIZE};
use crate::application::{EmbeddingProvider, Provider};
use crate::connector::http::{CallRequest, HttpClient};
use crate::domain::{ConnectorError, EmbeddingOptions, ProviderSettings};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";
const FALLBACK_DIMENSION: usize = 768;

/// Embeddings from a local Ollama daemon, one request per text.
pub struct OllamaEmbedding {
    http: HttpClient,
    base_url: String,
    model_name: String,
    batch_size: usize,
    keep_alive: i64,
    dimension: OnceCell<usize>,
}

impl OllamaEmbedding {
    pub fn new(settings: &ProviderSettings, http: HttpClient) -> Result<Self, ConnectorError> {
        Ok(Self {
            http,
            base_url: settings.str_or("base_url", DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            model_name: settings.str_or("model_name", DEFAULT_MODEL),
            batch_size: settings.usize_or("batch_size", DEFAULT_BATCH_SIZE)?,
            // -1 keeps the model loaded indefinitely
            keep_alive: settings.i64_or("keep_alive", -1)?,
            dimension: OnceCell::new(),
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ConnectorError> {
        let request = CallRequest::post(format!("{}/api/embeddings", self.base_url)).json(json!({
            "model": self.model_name,
            "prompt": text,
            "stream": false,
            "keep_alive": self.keep_alive,
        }));

        let response = self.http.send(&request).await?;
        let embedding = response
            .get("embedding")
            .ok_or_else(|| ConnectorError::processing("no embedding in response from Ollama"))?;
        parse_vector(embedding)
    }

    fn has_model(&self, tags: &Value) -> bool {
        tags.get("models")
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m.get("name").and_then(Value::as_str))
                    .any(|name| name.contains(self.model_name.as_str()))
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl Provider for OllamaEmbedding {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        match self.http.probe_json(&format!("{}/api/tags", self.base_url)).await {
            Ok((status, body)) if status.as_u16() == 200 => {
                // The daemon is up; a missing model only needs to be pulled.
                if !body.map(|tags| self.has_model(&tags)).unwrap_or(false) {
                    warn!("Model {} not found in Ollama", self.model_name);
                }
                Ok(true)
            }
            Ok((status, _)) => {
                warn!("Ollama health check returned status {}", status);
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    async fn embed(&self, texts: &[String], options: &EmbeddingOptions) -> anyhow::Result<Vec<Vec<f32>>> {
        let texts = prepare_texts(texts)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size(options, self.batch_size)) {
            for text in batch {
                embeddings.push(self.embed_one(text).await?);
            }
        }

        info!("Generated {} embeddings using {}", embeddings.len(), self.model_name);
        Ok(embeddings)
    }

    async fn dimension(&self) -> anyhow::Result<usize> {
        let dimension = self
            .dimension
            .get_or_init(|| async {
                match self.embed_one("test").await {
                    Ok(vector) if !vector.is_empty() => vector.len(),
                    Ok(_) => FALLBACK_DIMENSION,
                    Err(e) => {
                        warn!("Failed to discover embedding dimension ({}), assuming {}", e, FALLBACK_DIMENSION);
                        FALLBACK_DIMENSION
                    }
                }
            })
            .await;
        Ok(*dimension)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
