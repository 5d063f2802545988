//! Non-success response classification

use super::types::ResponseEnvelope;
use crate::error::{Error, API_ERROR_TITLE, UNEXPECTED_ERROR_TITLE};
use serde::Deserialize;
use tracing::debug;

/// Structured error body returned by the API: `{"error": {"message": ...}}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default, rename = "type")]
    pub kind: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_code: Option<String>,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Turns non-2xx responses into typed errors
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a response. The body is consumed and released on every path.
    pub async fn classify(&self, response: ResponseEnvelope) -> Error {
        let status = response.status();

        if response.is_forbidden_or_unauthorized() {
            response.ignore();
            return Error::forbidden(status);
        }

        let charset = response.charset();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Error::api(status, UNEXPECTED_ERROR_TITLE, e.detail()),
        };

        if let Some(message) = structured_message(&bytes) {
            debug!(status, "API returned structured error");
            return Error::api(status, API_ERROR_TITLE, message);
        }

        Error::api(status, UNEXPECTED_ERROR_TITLE, charset.decode(&bytes))
    }

    /// Classify a failure where no response was received. The detail joins
    /// the whole cause chain, so the innermost reason is kept.
    pub fn from_transport(&self, error: &(dyn std::error::Error + 'static)) -> Error {
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            detail = format!("{detail}: {cause}");
            source = cause.source();
        }
        Error::transport(detail)
    }
}

fn structured_message(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorResponse>(bytes)
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
}
