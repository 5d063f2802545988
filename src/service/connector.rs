//! Connector configuration resource

use super::models::ConnectorConfig;
use super::ServiceContext;
use crate::error::Result;

const RESOURCE: &str = "ConnectorConfigurations";

/// Client for `/connector/api/ConnectorConfigurations`
#[derive(Debug, Clone)]
pub struct ConnectorConfigClient {
    context: ServiceContext,
}

impl ConnectorConfigClient {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Configuration by id
    pub async fn get(&self, id: &str) -> Result<ConnectorConfig> {
        let url = self.context.resource_url(&[RESOURCE, id], &[])?;
        self.context.executor().get(&url).await
    }

    /// Configuration of a multi-tenanted connector
    pub async fn get_multi_tenanted(&self, connector_id: &str) -> Result<ConnectorConfig> {
        let url = self.context.resource_url(
            &[RESOURCE, "GetMultiTenanted"],
            &[("connectorId", connector_id)],
        )?;
        self.context.executor().get(&url).await
    }

    /// Every configuration visible to the caller
    pub async fn list(&self) -> Result<Vec<ConnectorConfig>> {
        let url = self.context.resource_url(&[RESOURCE], &[])?;
        self.context.executor().get_list(&url).await
    }
}
