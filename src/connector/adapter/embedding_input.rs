use serde_json::Value;

use crate::domain::{ConnectorError, EmbeddingOptions};

pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Trim every input, keeping positions so the i-th vector belongs to the
/// i-th text. A blank entry is rejected rather than dropped; an empty input
/// is fine and embeds to nothing.
pub fn prepare_texts(texts: &[String]) -> Result<Vec<String>, ConnectorError> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| match text.trim() {
            "" => Err(ConnectorError::validation(format!(
                "text at index {} is blank; nothing to embed",
                index
            ))),
            trimmed => Ok(trimmed.to_string()),
        })
        .collect()
}

pub fn batch_size(options: &EmbeddingOptions, configured: usize) -> usize {
    options.batch_size.unwrap_or(configured).max(1)
}

pub fn parse_vector(value: &Value) -> Result<Vec<f32>, ConnectorError> {
    let items = value
        .as_array()
        .ok_or_else(|| ConnectorError::processing("embedding is not an array"))?;

    items
        .iter()
        .map(|x| {
            x.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ConnectorError::processing(format!("embedding value is not a number: {}", x)))
        })
        .collect()
}

pub fn parse_vectors(values: &[Value]) -> Result<Vec<Vec<f32>>, ConnectorError> {
    values.iter().map(parse_vector).collect()
}
