//! Notification resource

use super::models::{Notification, NotificationAcknowledge};
use super::ServiceContext;
use crate::error::Result;
use tracing::debug;

const RESOURCE: &str = "Notifications";

/// Client for `/connector/api/Notifications`
#[derive(Debug, Clone)]
pub struct NotificationClient {
    context: ServiceContext,
}

impl NotificationClient {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Pending notifications for a connector
    pub async fn list(&self, connector_id: &str) -> Result<Vec<Notification>> {
        let url = self
            .context
            .resource_url(&[RESOURCE], &[("connectorId", connector_id)])?;
        self.context.executor().get_list(&url).await
    }

    /// Report that a notification has been processed
    pub async fn acknowledge(&self, acknowledgement: &NotificationAcknowledge) -> Result<()> {
        let url = self.context.resource_url(&[RESOURCE], &[])?;
        debug!(
            notification_id = %acknowledgement.notification_id,
            result = %acknowledgement.processing_result,
            "Acknowledging notification"
        );
        self.context.executor().post_void(&url, acknowledgement).await
    }
}
