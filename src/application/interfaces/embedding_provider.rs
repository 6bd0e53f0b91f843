use async_trait::async_trait;

use super::Provider;
use crate::domain::EmbeddingOptions;

/// Generates dense vectors for text.
#[async_trait]
pub trait EmbeddingProvider: Provider {
    /// One vector per input text, in input order. Blank texts are an error.
    async fn embed(&self, texts: &[String], options: &EmbeddingOptions) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Vector dimensionality. May call the service once and cache the answer.
    async fn dimension(&self) -> anyhow::Result<usize>;

    fn model_name(&self) -> &str;
}
