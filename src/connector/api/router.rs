use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{
    ChunkController, EmbedController, HealthController, InfoController, OcrController,
    TestConnectionController,
};

pub struct Router<'a> {
    chunk_controller: ChunkController<'a>,
    embed_controller: EmbedController<'a>,
    ocr_controller: OcrController<'a>,
    health_controller: HealthController<'a>,
    info_controller: InfoController<'a>,
    test_connection_controller: TestConnectionController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            chunk_controller: ChunkController::new(container),
            embed_controller: EmbedController::new(container),
            ocr_controller: OcrController::new(container),
            health_controller: HealthController::new(container),
            info_controller: InfoController::new(container),
            test_connection_controller: TestConnectionController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Chunk {
                path,
                chunk_size,
                chunk_overlap,
                annotate,
            } => {
                self.chunk_controller
                    .chunk(&path, chunk_size, chunk_overlap, annotate)
                    .await
            }
            Commands::Embed { texts, batch_size } => self.embed_controller.embed(texts, batch_size).await,
            Commands::Ocr { path, lang, psm } => self.ocr_controller.ocr(&path, lang, psm).await,
            Commands::Health { service } => self.health_controller.health(service).await,
            Commands::Info { service } => self.info_controller.info(&service).await,
            Commands::TestConnection {
                service,
                provider,
                settings,
            } => {
                self.test_connection_controller
                    .test_connection(&service, &provider, settings)
                    .await
            }
        }
    }
}
