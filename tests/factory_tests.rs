//! Connector factory caching, configuration layering and connection tests.

mod common;

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use common::{closed_port_url, fast_policy, serve};
use docconnect::connector::api::{Container, ContainerConfig};
use docconnect::{
    CacheKey, ChunkingOptions, ConnectorError, ConnectorFactory, EmbeddingOptions, EmbeddingProvider,
    Provider, ProviderCatalog, ProviderSettings, ServiceConfig, ServiceType, TestConnectionUseCase,
};

fn config(value: serde_json::Value) -> ServiceConfig {
    ServiceConfig::from_value(value).unwrap()
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_openai_without_key_fails_uncached_then_succeeds_with_key() {
    let factory = ConnectorFactory::new("/nonexistent/service_conf.toml");

    let without_key = config(json!({"provider": "openai", "openai": {"model_name": "text-embedding-3-small"}}));
    let err = factory
        .get_connector(ServiceType::Embedding, Some(&without_key))
        .unwrap_err();
    assert!(err.is_configuration(), "unexpected error: {}", err);
    assert_eq!(factory.instance_count(), 0);

    let with_key = config(json!({
        "provider": "openai",
        "openai": {"model_name": "text-embedding-3-small", "api_key": "sk-valid"}
    }));
    let connector = factory.embedding(Some(&with_key)).unwrap();
    assert_eq!(connector.provider_name(), "openai");
    assert_eq!(factory.instance_count(), 1);
    assert_ne!(
        CacheKey::for_config(ServiceType::Embedding, &without_key),
        CacheKey::for_config(ServiceType::Embedding, &with_key)
    );

    let info = serde_json::to_string(&connector.provider_info()).unwrap();
    assert!(!info.contains("sk-valid"));
}

#[test]
fn test_instances_are_partitioned_by_service_type() {
    let factory = ConnectorFactory::new("/nonexistent/service_conf.toml");
    let chunking = factory.get_connector(ServiceType::Chunking, None).unwrap();
    let embedding_cfg = config(json!({"provider": "mock"}));
    let embedding = factory
        .get_connector(ServiceType::Embedding, Some(&embedding_cfg))
        .unwrap();

    assert!(!chunking.ptr_eq(&embedding));
    assert_eq!(factory.instance_count(), 2);

    factory.clear_instances();
    assert_eq!(factory.instance_count(), 0);
}

#[test]
fn test_concurrent_requests_build_one_instance() {
    let factory = Arc::new(ConnectorFactory::new("/nonexistent/service_conf.toml"));
    let cfg = config(json!({"provider": "internal", "internal": {"chunk_size": 64, "chunk_overlap": 8}}));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let factory = factory.clone();
            let cfg = cfg.clone();
            std::thread::spawn(move || factory.chunking(Some(&cfg)).unwrap())
        })
        .collect();
    let connectors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(connectors.iter().all(|c| Arc::ptr_eq(c, &connectors[0])));
    assert_eq!(factory.instance_count(), 1);
}

#[tokio::test]
async fn test_config_file_with_env_substitution() {
    std::env::set_var("DOCCONNECT_FACTORY_TEST_CHUNK_SIZE", "10");
    let file = write_config(
        r#"
        [chunking_service]
        provider = "internal"

        [chunking_service.internal]
        chunk_size = "${DOCCONNECT_FACTORY_TEST_CHUNK_SIZE}"
        chunk_overlap = 3

        [embedding_service]
        provider = "mock"
        [embedding_service.mock]
        api_key = "${DOCCONNECT_FACTORY_TEST_UNSET_KEY}"
        dimension = 16
        "#,
    );
    let factory = ConnectorFactory::new(file.path());

    let chunker = factory.chunking(None).unwrap();
    let text = (0..25).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
    let chunks = chunker.process(&text, &ChunkingOptions::default()).await.unwrap();
    assert_eq!(chunks.len(), 4);

    let embedding = factory.load_config(ServiceType::Embedding);
    assert_eq!(
        embedding.provider_settings().get_str("api_key"),
        Some("${DOCCONNECT_FACTORY_TEST_UNSET_KEY}")
    );
    let embedder = factory.embedding(None).unwrap();
    assert_eq!(embedder.dimension().await.unwrap(), 16);
}

#[test]
fn test_config_is_cached_until_reload() {
    let file = write_config("[chunking_service]\nprovider = \"internal\"\n");
    let factory = ConnectorFactory::new(file.path());
    assert_eq!(factory.load_config(ServiceType::Chunking).provider(), Some("internal"));
    let first = factory.get_connector(ServiceType::Chunking, None).unwrap();

    // edits are invisible until reload
    std::fs::write(file.path(), "[chunking_service]\nprovider = \"semantic\"\n").unwrap();
    assert_eq!(factory.load_config(ServiceType::Chunking).provider(), Some("internal"));
    assert!(first.ptr_eq(&factory.get_connector(ServiceType::Chunking, None).unwrap()));

    factory.reload_config();
    assert_eq!(factory.instance_count(), 0);
    assert_eq!(factory.load_config(ServiceType::Chunking).provider(), Some("semantic"));
    let err = factory.get_connector(ServiceType::Chunking, None).unwrap_err();
    assert!(err.is_provider_not_found());
}

#[test]
fn test_broken_config_file_falls_back_to_defaults() {
    let file = write_config("[ocr_service\nthis is not toml");
    let factory = ConnectorFactory::new(file.path());
    let ocr = factory.load_config(ServiceType::Ocr);
    assert_eq!(ocr.provider(), Some("tesseract"));
    assert_eq!(ocr.provider_settings().get_str("url"), Some("http://localhost:8081"));
}

#[tokio::test]
async fn test_retry_ceiling_comes_from_connector_config() {
    let factory = ConnectorFactory::new("/nonexistent/service_conf.toml").with_backoff(fast_policy(1));
    let base_url = closed_port_url().await;
    let cfg = config(json!({
        "provider": "huggingface",
        "timeout": 1,
        "max_retries": 2,
        "huggingface": {"base_url": base_url}
    }));

    let connector = factory.embedding(Some(&cfg)).unwrap();
    assert_eq!(connector.max_retries(), 2);
    let err = connector
        .process(&["hello".to_string()], &EmbeddingOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_connection(), "unexpected error: {}", err);
    assert!(err.to_string().contains("2 attempt"));
}

struct ExplodingProbe;

#[async_trait]
impl Provider for ExplodingProbe {
    fn name(&self) -> &str {
        "exploding"
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        panic!("probe blew up")
    }
}

#[async_trait]
impl EmbeddingProvider for ExplodingProbe {
    async fn embed(&self, _texts: &[String], _options: &EmbeddingOptions) -> anyhow::Result<Vec<Vec<f32>>> {
        Err(anyhow::anyhow!("backend rejected input"))
    }

    async fn dimension(&self) -> anyhow::Result<usize> {
        Ok(3)
    }

    fn model_name(&self) -> &str {
        "exploding"
    }
}

fn catalog_with_custom_providers() -> ProviderCatalog {
    let mut catalog = ProviderCatalog::builtin();
    catalog.register_embedding("exploding", |_settings, _http| Ok(Box::new(ExplodingProbe)));
    catalog.register_embedding("panicking", |_settings, _http| panic!("constructor blew up"));
    catalog
}

#[tokio::test]
async fn test_health_check_is_total() {
    let factory = ConnectorFactory::with_catalog("/nonexistent/service_conf.toml", catalog_with_custom_providers());
    let connector = factory
        .embedding(Some(&config(json!({"provider": "exploding"}))))
        .unwrap();

    assert!(!connector.health_check().await);
    let status = connector.check_health().await;
    assert!(!status.healthy);
    assert!(status.detail.unwrap_or_default().contains("probe blew up"));

    let err = connector
        .process(&["x".to_string()], &EmbeddingOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_processing());
}

#[tokio::test]
async fn test_connection_reports_status_codes() {
    let factory = Arc::new(ConnectorFactory::with_catalog(
        "/nonexistent/service_conf.toml",
        catalog_with_custom_providers(),
    ));
    let use_case = TestConnectionUseCase::new(factory.clone());

    let not_found = use_case
        .execute("embedding", "cohere", ProviderSettings::default())
        .await
        .unwrap_err();
    assert_eq!(not_found.status_code(), 404);

    let bad_service = use_case
        .execute("translation", "internal", ProviderSettings::default())
        .await
        .unwrap_err();
    assert_eq!(bad_service.status_code(), 404);

    let missing_key = use_case
        .execute("embedding", "openai", ProviderSettings::default())
        .await
        .unwrap_err();
    assert_eq!(missing_key.status_code(), 400);

    let panicked = use_case
        .execute("embedding", "panicking", ProviderSettings::default())
        .await
        .unwrap_err();
    assert_eq!(panicked.status_code(), 500);

    let report = use_case
        .execute("chunking", "internal", ProviderSettings::default().with("chunk_size", 10).with("chunk_overlap", 2))
        .await
        .unwrap();
    assert!(report.success);
    assert_eq!(report.message, "Successfully connected to internal");
    let info = report.provider_info.unwrap();
    assert_eq!(info.timeout, 10.0);
    assert_eq!(info.max_retries, 1);

    // throwaway connectors are never registered
    assert_eq!(factory.instance_count(), 0);
}

#[tokio::test]
async fn test_connection_to_unhealthy_service() {
    let app = Router::new().route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let base = serve(app).await;

    let container = Container::new(ContainerConfig {
        config_path: Some("/nonexistent/service_conf.toml".into()),
        catalog: None,
    });
    let report = container
        .test_connection_use_case()
        .execute("ocr", "tesseract", ProviderSettings::default().with("url", base))
        .await
        .unwrap();

    assert!(!report.success);
    assert_eq!(report.message, "Service health check failed for tesseract");
    assert!(report.provider_info.is_none());
}

#[test]
fn test_unknown_service_name() {
    let err = "translation".parse::<ServiceType>().unwrap_err();
    assert!(matches!(err, ConnectorError::ProviderNotFound(_)));
}
