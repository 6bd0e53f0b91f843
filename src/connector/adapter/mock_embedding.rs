use async_trait::async_trait;
use rand::Rng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::embedding_input::prepare_texts;
use crate::application::{EmbeddingProvider, Provider};
use crate::domain::{ConnectorError, EmbeddingOptions, ProviderSettings};

const DEFAULT_DIMENSION: usize = 384;

/// Offline embedding provider: every text maps to a fixed pseudo-random unit
/// vector seeded from its hash.
pub struct MockEmbedding {
    model_name: String,
    dimension: usize,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            model_name: "mock-embedding".to_string(),
            dimension,
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ConnectorError> {
        Ok(Self {
            model_name: settings.str_or("model_name", "mock-embedding"),
            dimension: settings.usize_or("dimension", DEFAULT_DIMENSION)?,
        })
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        // SipHash keys vary between builds; SHA-256 keeps vectors stable.
        let digest = Sha256::digest(text.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);

        let mut rng = rand::rngs::StdRng::seed_from_u64(u64::from_le_bytes(seed));
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }

        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for MockEmbedding {
    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, texts: &[String], _options: &EmbeddingOptions) -> anyhow::Result<Vec<Vec<f32>>> {
        let texts = prepare_texts(texts)?;
        let vectors: Vec<Vec<f32>> = texts.iter().map(|t| self.generate_embedding(t)).collect();

        debug!("Generated {} mock embeddings", vectors.len());
        Ok(vectors)
    }

    async fn dimension(&self) -> anyhow::Result<usize> {
        Ok(self.dimension)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mock_embedding_consistency() {
        let service = MockEmbedding::new();
        let options = EmbeddingOptions::default();

        let first = service.embed(&texts(&["hello world"]), &options).await.unwrap();
        let second = service.embed(&texts(&["  hello world "]), &options).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mock_embedding_dimensions() {
        let service = MockEmbedding::with_dimension(128);

        let vectors = service
            .embed(&texts(&["a", "b", "c"]), &EmbeddingOptions::default())
            .await
            .unwrap();

        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 128));
        assert_eq!(service.dimension().await.unwrap(), 128);
    }

    #[tokio::test]
    async fn test_mock_embedding_normalized() {
        let service = MockEmbedding::new();

        let vectors = service.embed(&texts(&["test"]), &EmbeddingOptions::default()).await.unwrap();
        let magnitude: f32 = vectors[0].iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((magnitude - 1.0).abs() < 0.001);
    }
}
