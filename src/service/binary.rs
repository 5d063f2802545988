//! Binary content resource
//!
//! Large binaries bypass the API: the platform hands out a pre-authorized
//! blob URL, the content is PUT there directly, and the platform is then
//! told the upload finished.

use super::models::{DirectBinarySubmission, DirectBinarySubmissionOutput};
use super::ServiceContext;
use crate::error::Result;
use crate::http::{ApiRequest, BodySource};
use reqwest::Method;
use std::path::PathBuf;
use tracing::{debug, info};

const RESOURCE: &str = "Binaries";

/// Header the blob store needs on a direct upload
pub const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";

/// Blob type used for direct uploads
pub const BLOCK_BLOB: &str = "BlockBlob";

const DEFAULT_BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Client for `/connector/api/Binaries`
#[derive(Debug, Clone)]
pub struct BinaryClient {
    context: ServiceContext,
}

impl BinaryClient {
    pub fn new(context: ServiceContext) -> Self {
        Self { context }
    }

    /// Register a binary for archive without uploading content
    pub async fn submit(
        &self,
        connector_id: &str,
        item_external_id: &str,
        binary_external_id: &str,
    ) -> Result<()> {
        let url = self.context.resource_url(
            &[RESOURCE],
            &[
                ("ConnectorId", connector_id),
                ("ItemExternalId", item_external_id),
                ("BinaryExternalId", binary_external_id),
            ],
        )?;
        self.context
            .executor()
            .execute(&ApiRequest::new(Method::POST, url))
            .await?
            .ignore();
        Ok(())
    }

    /// Ask for a pre-authorized upload URL
    pub async fn upload_target(
        &self,
        submission: &DirectBinarySubmission,
    ) -> Result<DirectBinarySubmissionOutput> {
        let url = self.context.resource_url(&[RESOURCE, "GetSASToken"], &[])?;
        self.context.executor().post(&url, submission).await
    }

    /// Tell the platform a direct upload finished
    pub async fn notify_uploaded(&self, submission: &DirectBinarySubmission) -> Result<()> {
        let url = self
            .context
            .resource_url(&[RESOURCE, "NotifyBinarySubmission"], &[])?;
        self.context.executor().post_void(&url, submission).await
    }

    /// Upload a file: get a target, PUT the content there, then notify
    pub async fn submit_file(
        &self,
        submission: &DirectBinarySubmission,
        file: impl Into<PathBuf>,
    ) -> Result<()> {
        let target = self.upload_target(submission).await?;
        debug!(binary_external_id = %submission.binary_external_id, "Uploading binary content");

        let body = BodySource::File {
            path: file.into(),
            content_type: submission
                .mime_type
                .clone()
                .unwrap_or_else(|| DEFAULT_BINARY_CONTENT_TYPE.to_string()),
        };
        self.context
            .executor()
            .put_external(&target.url, body, &[(BLOB_TYPE_HEADER, BLOCK_BLOB)])
            .await?;

        self.notify_uploaded(submission).await?;
        info!(
            item_external_id = %submission.item_external_id,
            binary_external_id = %submission.binary_external_id,
            "Binary submitted"
        );
        Ok(())
    }
}
