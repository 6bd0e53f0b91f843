use serde::{Deserialize, Serialize};

/// A chunk produced by a chunking connector, with the counters downstream
/// stages persist next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub index: usize,
    pub total: usize,
    pub content: String,
    pub token_count: usize,
}

impl TextChunk {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

/// Attach position and whitespace-token counters to an ordered chunk sequence.
pub fn annotate_chunks(chunks: Vec<String>) -> Vec<TextChunk> {
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, content)| TextChunk {
            index,
            total,
            token_count: content.split_whitespace().count(),
            content,
        })
        .collect()
}
