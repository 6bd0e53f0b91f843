use anyhow::Result;
use serde_json::json;

use crate::domain::EmbeddingOptions;

use super::super::Container;

pub struct EmbedController<'a> {
    container: &'a Container,
}

impl<'a> EmbedController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn embed(&self, texts: Vec<String>, batch_size: Option<usize>) -> Result<String> {
        let connector = self.container.factory().embedding(None)?;
        let options = EmbeddingOptions { batch_size };
        let embeddings = connector.process(&texts, &options).await?;

        let output = json!({
            "provider": connector.provider_name(),
            "model": connector.model_name(),
            "dimension": embeddings.first().map(Vec::len).unwrap_or(0),
            "embeddings": embeddings,
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }
}
