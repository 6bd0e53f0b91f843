mod embedding_input;
mod huggingface_embedding;
mod internal_chunker;
mod mock_embedding;
mod ollama_embedding;
mod openai_embedding;
mod tesseract_ocr;

pub use embedding_input::*;
pub use huggingface_embedding::*;
pub use internal_chunker::*;
pub use mock_embedding::*;
pub use ollama_embedding::*;
pub use openai_embedding::*;
pub use tesseract_ocr::*;
