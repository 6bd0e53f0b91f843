use async_trait::async_trait;

/// Behavior shared by every provider, whatever service it implements.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registered provider name, e.g. `tesseract` or `huggingface`.
    fn name(&self) -> &str;

    /// Liveness probe. Providers without a remote dependency keep the default.
    ///
    /// `Ok(false)` means the service answered but is not usable; `Err` means
    /// the probe itself could not run.
    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}
