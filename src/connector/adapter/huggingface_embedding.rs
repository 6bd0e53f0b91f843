use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::embedding_input::{batch_size, parse_vectors, prepare_texts, DEFAULT_BATCH_SIZE};
use crate::application::{EmbeddingProvider, Provider};
use crate::connector::http::{CallRequest, HttpClient};
use crate::domain::{ConnectorError, EmbeddingOptions, ProviderSettings};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_MODEL: &str = "BAAI/bge-large-en-v1.5";
/// bge-large family width, used when the service cannot be asked.
const FALLBACK_DIMENSION: usize = 1024;

/// Client for a HuggingFace Text Embeddings Inference server.
pub struct HuggingFaceEmbedding {
    http: HttpClient,
    base_url: String,
    model_name: String,
    batch_size: usize,
    api_key: Option<String>,
    dimension: OnceCell<usize>,
}

impl HuggingFaceEmbedding {
    pub fn new(settings: &ProviderSettings, http: HttpClient) -> Result<Self, ConnectorError> {
        Ok(Self {
            http,
            base_url: settings.str_or("base_url", DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            model_name: settings.str_or("model_name", DEFAULT_MODEL),
            batch_size: settings.usize_or("batch_size", DEFAULT_BATCH_SIZE)?,
            api_key: settings.get_str("api_key").map(str::to_string),
            dimension: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, ConnectorError> {
        let mut request = CallRequest::post(format!("{}/embed", self.base_url))
            .json(json!({"inputs": batch, "normalize": true}));
        if let Some(key) = &self.api_key {
            request = request.bearer(key);
        }

        let response = self.http.send(&request).await?;
        let vectors = match &response {
            Value::Array(items) => parse_vectors(items)?,
            Value::Object(map) => match map.get("embeddings") {
                Some(Value::Array(items)) => parse_vectors(items)?,
                _ => {
                    return Err(ConnectorError::processing(
                        "unexpected response format from TEI service",
                    ))
                }
            },
            _ => {
                return Err(ConnectorError::processing(
                    "unexpected response format from TEI service",
                ))
            }
        };

        if vectors.len() != batch.len() {
            return Err(ConnectorError::processing(format!(
                "TEI returned {} embeddings for {} inputs",
                vectors.len(),
                batch.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Provider for HuggingFaceEmbedding {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        match self.http.probe(&format!("{}/health", self.base_url)).await {
            Ok(status) if status.as_u16() == 200 => Ok(true),
            Ok(status) => {
                warn!("TEI health check returned status {}", status);
                Ok(false)
            }
            Err(e) => {
                warn!("TEI health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbedding {
    async fn embed(&self, texts: &[String], options: &EmbeddingOptions) -> anyhow::Result<Vec<Vec<f32>>> {
        let texts = prepare_texts(texts)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size(options, self.batch_size)) {
            embeddings.extend(self.embed_batch(batch).await?);
        }

        info!("Generated {} embeddings with {}", embeddings.len(), self.model_name);
        Ok(embeddings)
    }

    async fn dimension(&self) -> anyhow::Result<usize> {
        let dimension = self
            .dimension
            .get_or_init(|| async {
                match self.embed_batch(&["test".to_string()]).await {
                    Ok(vectors) if !vectors.is_empty() && !vectors[0].is_empty() => {
                        info!("Embedding dimension for {}: {}", self.model_name, vectors[0].len());
                        vectors[0].len()
                    }
                    Ok(_) => {
                        warn!("TEI returned no probe embedding, assuming dimension {}", FALLBACK_DIMENSION);
                        FALLBACK_DIMENSION
                    }
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
