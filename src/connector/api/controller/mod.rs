pub mod chunk_controller;
pub mod embed_controller;
pub mod health_controller;
pub mod info_controller;
pub mod ocr_controller;
pub mod test_connection_controller;

pub use chunk_controller::ChunkController;
pub use embed_controller::EmbedController;
pub use health_controller::HealthController;
pub use info_controller::InfoController;
pub use ocr_controller::OcrController;
pub use test_connection_controller::TestConnectionController;
