//! Resource clients for the connector API
//!
//! Thin URL-building wrappers over the
//! [`AuthenticatedRequestExecutor`](crate::http::AuthenticatedRequestExecutor).
//! Every client shares one [`ServiceContext`], and with it one token cache
//! and one transport.

mod aggregation;
mod audit;
mod binary;
mod connector;
mod item;
mod models;
mod notification;

pub use aggregation::AggregationClient;
pub use audit::AuditEventClient;
pub use binary::{BinaryClient, BLOB_TYPE_HEADER, BLOCK_BLOB};
pub use connector::ConnectorConfigClient;
pub use item::{ItemClient, DEFAULT_PAGE_SIZE};
pub use models::{
    Aggregation, AggregationSubmission, AuditEvent, ConnectorConfig, DirectBinarySubmission,
    DirectBinarySubmissionOutput, Item, ItemAcceptance, ItemSubmission, Metadata, Notification,
    NotificationAcknowledge, NotificationItem, RecordMediaType, RelationshipData,
};
pub use notification::NotificationClient;

use crate::error::{Error, Result};
use crate::http::AuthenticatedRequestExecutor;
use std::sync::Arc;
use url::Url;

/// Path prefix of every connector API resource
const API_ROOT: [&str; 2] = ["connector", "api"];

/// Executor and base URL shared by the resource clients
#[derive(Debug, Clone)]
pub struct ServiceContext {
    executor: Arc<AuthenticatedRequestExecutor>,
    base_url: Url,
}

impl ServiceContext {
    pub fn new(executor: Arc<AuthenticatedRequestExecutor>, base_url: Url) -> Self {
        Self { executor, base_url }
    }

    pub fn executor(&self) -> &AuthenticatedRequestExecutor {
        &self.executor
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resource URL: `{base}/connector/api/{segments...}?{query}`
    ///
    /// Segments are percent-encoded, so field values may contain `/`.
    pub fn resource_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::invalid_value("ConnectorApiUrl", "URL cannot carry a path")
            })?;
            path.pop_if_empty();
            path.extend(API_ROOT);
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests;
