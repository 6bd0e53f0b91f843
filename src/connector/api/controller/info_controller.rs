use anyhow::Result;

use crate::domain::ServiceType;

use super::super::Container;

pub struct InfoController<'a> {
    container: &'a Container,
}

impl<'a> InfoController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn info(&self, service: &str) -> Result<String> {
        let service: ServiceType = service.parse()?;
        let connector = self.container.factory().get_connector(service, None)?;
        Ok(serde_json::to_string_pretty(&connector.provider_info())?)
    }
}
