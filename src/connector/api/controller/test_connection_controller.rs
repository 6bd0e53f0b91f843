use anyhow::Result;
use serde_json::{json, Value};

use crate::domain::ProviderSettings;

use super::super::Container;

pub struct TestConnectionController<'a> {
    container: &'a Container,
}

impl<'a> TestConnectionController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn test_connection(
        &self,
        service: &str,
        provider: &str,
        settings: Vec<(String, Value)>,
    ) -> Result<String> {
        let settings = settings
            .into_iter()
            .fold(ProviderSettings::default(), |acc, (key, value)| acc.with(key, value));

        let use_case = self.container.test_connection_use_case();
        let output = match use_case.execute(service, provider, settings).await {
            Ok(report) => serde_json::to_value(report)?,
            Err(e) => json!({
                "success": false,
                "status_code": e.status_code(),
                "message": e.to_string(),
            }),
        };
        Ok(serde_json::to_string_pretty(&output)?)
    }
}
