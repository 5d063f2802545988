//! Audit event resource

use super::models::AuditEvent;
use super::ServiceContext;
use crate::error::Result;

/// Client for `/connector/api/AuditEvents`
#[derive(Debug, Clone)]
pub struct AuditEventClient {
    context: ServiceContext,
}

impl AuditEventClient {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Record an event that happened in the content source
    pub async fn submit(&self, event: &AuditEvent) -> Result<()> {
        let url = self.context.resource_url(&["AuditEvents"], &[])?;
        self.context.executor().put_void(&url, event).await
    }
}
