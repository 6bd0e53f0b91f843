use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::embedding_input::{batch_size, parse_vector, prepare_texts, DEFAULT_BATCH_SIZE};
use crate::application::{EmbeddingProvider, Provider};
use crate::connector::http::{CallRequest, HttpClient};
use crate::domain::{ConnectorError, EmbeddingOptions, ProviderSettings};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const FALLBACK_DIMENSION: usize = 1536;

/// Published output widths of the hosted embedding models.
const MODEL_DIMENSIONS: [(&str, usize); 3] = [
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("text-embedding-ada-002", 1536),
];

pub struct OpenAiEmbedding {
    http: HttpClient,
    api_key: String,
    base_url: String,
    model_name: String,
    batch_size: usize,
}

impl OpenAiEmbedding {
    /// Fails with a configuration error when `api_key` is absent or blank.
    pub fn new(settings: &ProviderSettings, http: HttpClient) -> Result<Self, ConnectorError> {
        let api_key = settings
            .get_str("api_key")
            .ok_or_else(|| ConnectorError::configuration("api_key is required for OpenAI embedding"))?
            .to_string();

        Ok(Self {
            http,
            api_key,
            base_url: settings.str_or("base_url", DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            model_name: settings.str_or("model_name", DEFAULT_MODEL),
            batch_size: settings.usize_or("batch_size", DEFAULT_BATCH_SIZE)?,
        })
    }

    pub fn known_dimension(model: &str) -> Option<usize> {
        MODEL_DIMENSIONS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, dim)| *dim)
    }

    fn request(&self, batch: &[String]) -> CallRequest {
        CallRequest::post(format!("{}/embeddings", self.base_url))
            .bearer(&self.api_key)
            .json(json!({"model": self.model_name, "input": batch}))
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, ConnectorError> {
        let response = self.http.send(&self.request(batch)).await?;
        Self::parse_response(&response)
    }

    fn parse_response(response: &Value) -> Result<Vec<Vec<f32>>, ConnectorError> {
        let data = response
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| ConnectorError::processing("OpenAI response has no data array"))?;

        let mut indexed = data
            .iter()
            .map(|item| {
                let index = item.get("index").and_then(Value::as_u64).unwrap_or(0);
                let embedding = item
                    .get("embedding")
                    .ok_or_else(|| ConnectorError::processing("OpenAI response item has no embedding"))?;
                Ok((index, parse_vector(embedding)?))
            })
            .collect::<Result<Vec<_>, ConnectorError>>()?;
        indexed.sort_by_key(|(index, _)| *index);

        Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
    }
}

#[async_trait]
impl Provider for OpenAiEmbedding {
    fn name(&self) -> &str {
        "openai"
    }

    // The API has no health endpoint; a one-word embedding under the health-check
    // timeout stands in for it.
    async fn health_check(&self) -> anyhow::Result<bool> {
        let request = self.request(&["health check".to_string()]);
        match self.http.probe_send(&request).await.and_then(|r| Self::parse_response(&r)) {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, texts: &[String], options: &EmbeddingOptions) -> anyhow::Result<Vec<Vec<f32>>> {
        let texts = prepare_texts(texts)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size(options, self.batch_size)) {
            embeddings.extend(self.embed_batch(batch).await?);
        }

        info!("Generated {} embeddings using {}", embeddings.len(), self.model_name);
        Ok(embeddings)
    }

    async fn dimension(&self) -> anyhow::Result<usize> {
        if let Some(dimension) = Self::known_dimension(&self.model_name) {
            return Ok(dimension);
        }

        match self.embed_batch(&["test".to_string()]).await {
            Ok(vectors) if vectors.first().is_some_and(|v| !v.is_empty()) => Ok(vectors[0].len()),
            Ok(_) => Ok(FALLBACK_DIMENSION),
            Err(e) => {
                warn!("Failed to determine embedding dimension: {}", e);
                Ok(FALLBACK_DIMENSION)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
