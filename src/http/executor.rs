//! Authenticated request executor
//!
//! Every API call goes through [`AuthenticatedRequestExecutor::execute`]:
//!
//! 1. take a token from the [`TokenCache`] and attach it as a bearer header
//! 2. send through the [`Transport`]
//! 3. on 401/403, reset the token and send the same logical request once more
//! 4. classify anything that is still not 2xx
//!
//! Other failures are never retried.

use super::classify::ErrorClassifier;
use super::media_type::Charset;
use super::transport::Transport;
use super::types::{ApiRequest, BodySource, RequestDescriptor, ResponseEnvelope};
use crate::auth::TokenCache;
use crate::decode::JsonMapper;
use crate::error::{Error, Result};
use crate::types::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the bearer token
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Sends requests with a bearer token and retries once on authorization failure
pub struct AuthenticatedRequestExecutor {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenCache>,
    classifier: ErrorClassifier,
    mapper: JsonMapper,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl AuthenticatedRequestExecutor {
    /// Create an executor with default timeouts
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<TokenCache>) -> Self {
        Self {
            transport,
            tokens,
            classifier: ErrorClassifier,
            mapper: JsonMapper::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the timeouts put on every request. Zero disables a timeout.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn mapper(&self) -> &JsonMapper {
        &self.mapper
    }

    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Execute a logical request, returning the 2xx response
    pub async fn execute(&self, request: &ApiRequest) -> Result<ResponseEnvelope> {
        let token = self.tokens.access_token().await?;
        let response = self.send(request, Some(&token)).await?;

        if response.is_success() {
            return Ok(response);
        }
        if !response.is_forbidden_or_unauthorized() {
            return Err(self.classifier.classify(response).await);
        }

        warn!(
            status = response.status(),
            url = %request.url,
            "Request not authorized, refreshing token and retrying once"
        );
        response.ignore();

        let token = self.tokens.reset_token().await?;
        let retry = self.send(request, Some(&token)).await?;

        if retry.is_success() {
            Ok(retry)
        } else {
            Err(self.classifier.classify(retry).await)
        }
    }

    /// Execute without a bearer token and without the authorization retry
    pub async fn execute_unauthenticated(&self, request: &ApiRequest) -> Result<ResponseEnvelope> {
        let response = self.send(request, None).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(self.classifier.classify(response).await)
        }
    }

    /// Build a fresh descriptor for one attempt and send it
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<ResponseEnvelope> {
        if !self.transport.supports_method(&request.method) {
            return Err(Error::transport(format!(
                "Transport does not support method {}",
                request.method
            )));
        }

        let mut descriptor = RequestDescriptor::new(request.method.clone(), request.url.clone())
            .timeouts(self.connect_timeout, self.read_timeout);
        descriptor.headers.clone_from(&request.headers);

        if let Some(token) = token {
            descriptor = descriptor.header(AUTHORIZATION_HEADER, format!("Bearer {token}"));
        }
        if let Some(body) = request.body.open().await? {
            descriptor = descriptor.body(request.body.content_type().map(str::to_string), body);
        }

        debug!(method = %request.method, url = %request.url, "Executing request");
        self.transport.send(descriptor).await
    }

    // ========================================================================
    // Call shapes
    // ========================================================================

    /// GET a single object
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.execute(&ApiRequest::new(Method::GET, url)).await?;
        self.read(response).await
    }

    /// GET a list of objects; a bodiless response is an empty list
    pub async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let response = self.execute(&ApiRequest::new(Method::GET, url)).await?;
        self.read_list(response).await
    }

    /// POST a JSON payload and parse the response
    pub async fn post<P, T>(&self, url: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(Method::POST, url).body(self.json_body(payload)?);
        let response = self.execute(&request).await?;
        self.read(response).await
    }

    /// POST a JSON payload, discarding the response body
    pub async fn post_void<P: Serialize + ?Sized>(&self, url: &str, payload: &P) -> Result<()> {
        let request = ApiRequest::new(Method::POST, url).body(self.json_body(payload)?);
        self.execute(&request).await?.ignore();
        Ok(())
    }

    /// POST with no body and parse the response
    pub async fn post_empty<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.execute(&ApiRequest::new(Method::POST, url)).await?;
        self.read(response).await
    }

    /// PUT a JSON payload and parse the response
    pub async fn put<P, T>(&self, url: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::new(Method::PUT, url).body(self.json_body(payload)?);
        let response = self.execute(&request).await?;
        self.read(response).await
    }

    /// PUT a JSON payload, discarding the response body
    pub async fn put_void<P: Serialize + ?Sized>(&self, url: &str, payload: &P) -> Result<()> {
        let request = ApiRequest::new(Method::PUT, url).body(self.json_body(payload)?);
        self.execute(&request).await?.ignore();
        Ok(())
    }

    /// PUT a raw body to a pre-authorized external URL (no bearer token)
    pub async fn put_external(
        &self,
        url: &str,
        body: BodySource,
        headers: &[(&str, &str)],
    ) -> Result<()> {
        let mut request = ApiRequest::new(Method::PUT, url).body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute_unauthenticated(&request).await?.ignore();
        Ok(())
    }

    // ========================================================================
    // Response mapping
    // ========================================================================

    fn json_body<P: Serialize + ?Sized>(&self, payload: &P) -> Result<BodySource> {
        let bytes = self.mapper.serialize_bytes(payload)?;
        Ok(BodySource::Json(Bytes::from(bytes)))
    }

    /// Parse a success body; bodiless responses read as JSON `null`
    async fn read<T: DeserializeOwned>(&self, response: ResponseEnvelope) -> Result<T> {
        if !response.has_message_body() {
            response.ignore();
            return self.mapper.parse(b"null", &Charset::Utf8);
        }
        let charset = response.charset();
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return self.mapper.parse(b"null", &Charset::Utf8);
        }
        self.mapper.parse(&bytes, &charset)
    }

    async fn read_list<T: DeserializeOwned>(&self, response: ResponseEnvelope) -> Result<Vec<T>> {
        if !response.has_message_body() {
            response.ignore();
            return Ok(Vec::new());
        }
        let charset = response.charset();
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        self.mapper.parse_list(&bytes, &charset)
    }
}

impl std::fmt::Debug for AuthenticatedRequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedRequestExecutor")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}
