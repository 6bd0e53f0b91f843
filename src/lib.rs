pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::Commands;

pub use application::{
    ChunkingConnector, ChunkingProvider, Connector, ConnectorBuilder, ConnectorSettings,
    ConnectionReport, ConnectionTestError, EmbeddingConnector, EmbeddingProvider, OcrConnector,
    OcrProvider, Provider, ServiceConnector, TestConnectionUseCase,
};

pub use connector::{
    ConfigDocument, ConfigOrigin, ConnectorFactory, HttpClient, ProviderCatalog, RetryPolicy,
};

pub use domain::{
    annotate_chunks, CacheKey, ChunkingOptions, ConnectorError, EmbeddingOptions, ErrorKind,
    HealthStatus, OcrOptions, ProviderInfo, ProviderSettings, ServiceConfig, ServiceType, TextChunk,
};
