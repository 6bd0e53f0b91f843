use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::application::{OcrProvider, Provider};
use crate::connector::http::{CallRequest, HttpClient, MultipartUpload};
use crate::domain::{ConnectorError, OcrOptions, ProviderSettings};

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_LANG: &str = "eng+kor";
const DEFAULT_PSM: u8 = 3;

/// OCR through a Tesseract HTTP wrapper exposing `POST /api/ocr`.
pub struct TesseractOcr {
    http: HttpClient,
    url: String,
    lang: String,
}

impl TesseractOcr {
    /// A `timeout` in the provider section overrides the connector timeout
    /// for OCR requests.
    pub fn new(settings: &ProviderSettings, http: HttpClient) -> Result<Self, ConnectorError> {
        let http = match settings.get("timeout") {
            None => http,
            Some(_) => http.with_timeout(request_timeout(settings)?)?,
        };

        Ok(Self {
            http,
            url: settings.str_or("url", DEFAULT_URL).trim_end_matches('/').to_string(),
            lang: settings.str_or("lang", DEFAULT_LANG),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn timeout(&self) -> Duration {
        self.http.timeout()
    }
}

fn request_timeout(settings: &ProviderSettings) -> Result<Duration, ConnectorError> {
    let secs = settings.f64_or("timeout", 0.0)?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConnectorError::configuration(format!(
            "tesseract timeout must be a positive number of seconds, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ConnectorError::configuration(format!("invalid tesseract timeout {}: {}", secs, e)))
}

/// Reject empty or undecodable images before they reach the service.
pub fn validate_image(image: &[u8]) -> Result<(), ConnectorError> {
    if image.is_empty() {
        return Err(ConnectorError::validation("image data cannot be empty"));
    }
    image::load_from_memory(image)
        .map(|_| ())
        .map_err(|e| ConnectorError::validation(format!("invalid image data: {}", e)))
}

#[async_trait]
impl Provider for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        match self.http.probe(&format!("{}/health", self.url)).await {
            Ok(status) => Ok(status.as_u16() == 200),
            Err(e) => {
                warn!("Tesseract health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl OcrProvider for TesseractOcr {
    async fn extract_text(&self, image: &[u8], options: &OcrOptions) -> anyhow::Result<String> {
        validate_image(image)?;

        let lang = options.lang.as_deref().unwrap_or(&self.lang);
        let request = CallRequest::post(format!("{}/api/ocr", self.url))
            .query("lang", lang)
            .query("psm", options.psm.unwrap_or(DEFAULT_PSM))
            .multipart(MultipartUpload {
                field: "image".to_string(),
                file_name: "image.jpg".to_string(),
                mime: "image/jpeg".to_string(),
                bytes: image.to_vec(),
            });

        let response = self.http.send(&request).await?;
        let text = response
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        info!("Extracted {} characters from image", text.chars().count());
        Ok(text)
    }
}
