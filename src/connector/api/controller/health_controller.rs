use anyhow::Result;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::ServiceType;

use super::super::Container;

pub struct HealthController<'a> {
    container: &'a Container,
}

impl<'a> HealthController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn health(&self, service: Option<String>) -> Result<String> {
        let services = match service {
            Some(name) => vec![name.parse::<ServiceType>()?],
            None => ServiceType::ALL.to_vec(),
        };

        let mut report = Map::new();
        for service in services {
            report.insert(service.to_string(), self.probe(service).await);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(report))?)
    }

    async fn probe(&self, service: ServiceType) -> Value {
        match self.container.factory().get_connector(service, None) {
            Ok(connector) => {
                let status = connector.check_health().await;
                json!({
                    "provider": connector.provider_name(),
                    "healthy": status.healthy,
                    "latency_ms": status.latency_ms,
                    "detail": status.detail,
                })
            }
            Err(e) => {
                warn!("Cannot create {} connector: {}", service, e);
                json!({
                    "healthy": false,
                    "error": e.to_string(),
                    "status_code": e.status_code(),
                })
            }
        }
    }
}
