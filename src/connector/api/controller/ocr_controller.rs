use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::domain::OcrOptions;

use super::super::Container;

pub struct OcrController<'a> {
    container: &'a Container,
}

impl<'a> OcrController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ocr(&self, path: &Path, lang: Option<String>, psm: Option<u8>) -> Result<String> {
        let image = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let connector = self.container.factory().ocr(None)?;
        let text = connector.process(&image, &OcrOptions { lang, psm }).await?;

        Ok(serde_json::to_string_pretty(&json!({
            "provider": connector.provider_name(),
            "text": text,
        }))?)
    }
}
