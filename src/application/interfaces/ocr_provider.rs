use async_trait::async_trait;

use super::Provider;
use crate::domain::OcrOptions;

/// Extracts text from raw image bytes.
#[async_trait]
pub trait OcrProvider: Provider {
    async fn extract_text(&self, image: &[u8], options: &OcrOptions) -> anyhow::Result<String>;
}
