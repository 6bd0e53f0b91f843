use serde::{Deserialize, Serialize};

/// Per-call overrides for OCR extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrOptions {
    /// Tesseract-style language string, e.g. `eng+kor`.
    pub lang: Option<String>,
    /// Page segmentation mode.
    pub psm: Option<u8>,
}

impl OcrOptions {
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = Some(psm);
        self
    }
}

/// Per-call overrides for chunking. Signed so that invalid values reach validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingOptions {
    pub chunk_size: Option<i64>,
    pub chunk_overlap: Option<i64>,
}

impl ChunkingOptions {
    pub fn new(chunk_size: i64, chunk_overlap: i64) -> Self {
        Self {
            chunk_size: Some(chunk_size),
            chunk_overlap: Some(chunk_overlap),
        }
    }
}

/// Per-call overrides for embedding generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingOptions {
    pub batch_size: Option<usize>,
}

impl EmbeddingOptions {
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size),
        }
    }
}
