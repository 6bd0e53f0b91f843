use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::application::{ChunkingProvider, Provider};
use crate::domain::{ChunkingOptions, ConnectorError, ProviderSettings};

pub const DEFAULT_CHUNK_SIZE: i64 = 512;
pub const DEFAULT_CHUNK_OVERLAP: i64 = 50;
pub const DEFAULT_DELIMITER: &str = r"[\n!?。；！？\.\s]+";

/// Local sliding-window chunker over whitespace tokens.
///
/// Every chunk holds at most `chunk_size` tokens and starts
/// `chunk_size - chunk_overlap` tokens after its predecessor, so consecutive
/// chunks share exactly `chunk_overlap` tokens. The window stops as soon as
/// it reaches the last token.
pub struct InternalChunker {
    chunk_size: i64,
    chunk_overlap: i64,
    delimiter: String,
}

impl InternalChunker {
    pub fn new(chunk_size: i64, chunk_overlap: i64) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ConnectorError> {
        let chunk_size = settings.i64_or("chunk_size", DEFAULT_CHUNK_SIZE)?;
        let chunk_overlap = settings.i64_or("chunk_overlap", DEFAULT_CHUNK_OVERLAP)?;
        let delimiter = settings.str_or("delimiter", DEFAULT_DELIMITER);
        Regex::new(&delimiter).map_err(|e| {
            ConnectorError::configuration(format!("invalid chunk delimiter '{}': {}", delimiter, e))
        })?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
            delimiter,
        })
    }

    pub fn chunk_size(&self) -> i64 {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> i64 {
        self.chunk_overlap
    }

    /// Sentence delimiter pattern, kept for splitters that work on sentences.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn chunk(&self, text: &str, options: &ChunkingOptions) -> Result<Vec<String>, ConnectorError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = options.chunk_size.unwrap_or(self.chunk_size);
        let chunk_overlap = options.chunk_overlap.unwrap_or(self.chunk_overlap);
        validate(chunk_size, chunk_overlap)?;

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let size = chunk_size as usize;
        if tokens.len() <= size {
            return Ok(vec![tokens.join(" ")]);
        }

        let stride = (chunk_size - chunk_overlap) as usize;
        let mut chunks = Vec::with_capacity(tokens.len() / stride + 1);
        let mut start = 0;
        loop {
            let end = (start + size).min(tokens.len());
            chunks.push(tokens[start..end].join(" "));
            if end == tokens.len() {
                break;
            }
            start += stride;
        }

        debug!(
            "Split {} tokens into {} chunks (size {}, overlap {})",
            tokens.len(),
            chunks.len(),
            chunk_size,
            chunk_overlap
        );
        Ok(chunks)
    }
}

impl Default for InternalChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

fn validate(chunk_size: i64, chunk_overlap: i64) -> Result<(), ConnectorError> {
    if chunk_size <= 0 {
        return Err(ConnectorError::validation(format!(
            "chunk_size must be positive, got {}",
            chunk_size
        )));
    }
    if chunk_overlap < 0 || chunk_overlap >= chunk_size {
        return Err(ConnectorError::validation(format!(
            "chunk_overlap must be >= 0 and < chunk_size ({}), got {}",
            chunk_size, chunk_overlap
        )));
    }
    Ok(())
}

#[async_trait]
impl Provider for InternalChunker {
    fn name(&self) -> &str {
        "internal"
    }
}

#[async_trait]
impl ChunkingProvider for InternalChunker {
    async fn chunk_text(&self, text: &str, options: &ChunkingOptions) -> anyhow::Result<Vec<String>> {
        Ok(self.chunk(text, options)?)
    }
}
