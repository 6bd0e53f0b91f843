use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::domain::{annotate_chunks, ChunkingOptions};

use super::super::Container;

pub struct ChunkController<'a> {
    container: &'a Container,
}

impl<'a> ChunkController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chunk(
        &self,
        path: &Path,
        chunk_size: Option<i64>,
        chunk_overlap: Option<i64>,
        annotate: bool,
    ) -> Result<String> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let connector = self.container.factory().chunking(None)?;
        let options = ChunkingOptions {
            chunk_size,
            chunk_overlap,
        };
        let chunks = connector.process(&text, &options).await?;

        let output = if annotate {
            serde_json::to_value(annotate_chunks(chunks))?
        } else {
            json!(chunks)
        };
        Ok(serde_json::to_string_pretty(&output)?)
    }
}
