use async_trait::async_trait;

use super::Provider;
use crate::domain::ChunkingOptions;

/// Splits text into an ordered sequence of (possibly overlapping) chunks.
#[async_trait]
pub trait ChunkingProvider: Provider {
    async fn chunk_text(&self, text: &str, options: &ChunkingOptions) -> anyhow::Result<Vec<String>>;
}
