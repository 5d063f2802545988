//! Aggregation (container record) resource

use super::models::{Aggregation, AggregationSubmission};
use super::ServiceContext;
use crate::error::Result;
use tracing::debug;

const RESOURCE: &str = "Aggregations";
const MULTI_TENANTED: &str = "MultiTenanted";

/// Client for `/connector/api/Aggregations`
#[derive(Debug, Clone)]
pub struct AggregationClient {
    context: ServiceContext,
}

impl AggregationClient {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Aggregations whose `field` equals `value`
    pub async fn get(&self, field: &str, value: &str) -> Result<Vec<Aggregation>> {
        let url = self.context.resource_url(&[RESOURCE, field, value], &[])?;
        self.context.executor().get_list(&url).await
    }

    /// Same lookup for a multi-tenanted connector
    pub async fn get_multi_tenanted(
        &self,
        field: &str,
        value: &str,
        connector_id: &str,
    ) -> Result<Vec<Aggregation>> {
        let url = self.context.resource_url(
            &[RESOURCE, MULTI_TENANTED, field, value],
            &[("connectorId", connector_id)],
        )?;
        self.context.executor().get_list(&url).await
    }

    /// Create or update an aggregation
    pub async fn submit(&self, submission: &AggregationSubmission) -> Result<()> {
        let url = self.context.resource_url(&[RESOURCE], &[])?;
        debug!(external_id = %submission.external_id, "Submitting aggregation");
        self.context.executor().post_void(&url, submission).await
    }
}
