//! Item (leaf record) resource

use super::models::{Item, ItemAcceptance, ItemSubmission};
use super::ServiceContext;
use crate::error::Result;
use tracing::debug;

const RESOURCE: &str = "Items";

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Client for `/connector/api/Items`
#[derive(Debug, Clone)]
pub struct ItemClient {
    context: ServiceContext,
}

impl ItemClient {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Submit an item; the platform answers with its acceptance record
    pub async fn submit(&self, submission: &ItemSubmission) -> Result<ItemAcceptance> {
        let url = self.context.resource_url(&[RESOURCE], &[])?;
        debug!(external_id = %submission.external_id, "Submitting item");
        self.context.executor().post(&url, submission).await
    }

    /// Items whose `field` equals `value`
    pub async fn get(&self, field: &str, value: &str, page_size: Option<u32>) -> Result<Vec<Item>> {
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).to_string();
        let url = self
            .context
            .resource_url(&[RESOURCE, field, value], &[("pagesize", page_size.as_str())])?;
        self.context.executor().get_list(&url).await
    }

    /// Same lookup for a multi-tenanted connector
    pub async fn get_multi_tenanted(
        &self,
        field: &str,
        value: &str,
        connector_id: &str,
    ) -> Result<Vec<Item>> {
        let url = self
            .context
            .resource_url(&[RESOURCE, field, value], &[("connectorId", connector_id)])?;
        self.context.executor().get_list(&url).await
    }
}
