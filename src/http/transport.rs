//! Wire transport
//!
//! The [`Transport`] trait is the only seam between the SDK and an HTTP
//! implementation. [`ReqwestTransport`] is the default, built on a pooled
//! `reqwest` client with redirects disabled; retry policy lives in the
//! executor, never here.
//!
//! The read timeout is an inactivity timeout: it fires only when no upload
//! chunk was sent and no response bytes arrived for the whole interval.
//! `reqwest`'s own request timeout is a total deadline and is not used.

use super::classify::ErrorClassifier;
use super::types::{RequestBody, RequestDescriptor, ResponseBody, ResponseEnvelope};
use crate::error::{Error, Result};
use crate::types::default_user_agent;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{redirect, Client};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Sends one request and returns the response headers with a lazy body
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. Resolves once status and headers are available.
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseEnvelope>;

    /// Whether this transport can send `method`
    fn supports_method(&self, _method: &reqwest::Method) -> bool {
        true
    }

    /// Stop accepting requests and release pooled connections.
    /// In-flight requests are allowed to complete.
    async fn shutdown(&self) {}
}

/// Configuration for [`ReqwestTransport`]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Zero means no connect timeout
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::ZERO,
            user_agent: default_user_agent(),
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
        }
    }
}

/// [`Transport`] backed by a pooled `reqwest` client
pub struct ReqwestTransport {
    client: RwLock<Option<Client>>,
}

impl ReqwestTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default())
    }

    /// Create a transport with custom configuration
    ///
    /// `reqwest` only supports a connect timeout per client, so the
    /// descriptor's connect timeout is fixed here rather than per request.
    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        Ok(Self::with_client(build_client(config)?))
    }

    /// Wrap an existing client. The caller is responsible for its redirect policy.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    /// Whether [`Transport::shutdown`] has been called
    pub fn is_shutdown(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn client(&self) -> Result<Client> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::transport("Transport has been shut down"))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<ResponseEnvelope> {
        let client = self.client()?;
        let RequestDescriptor {
            method,
            url,
            content_type,
            headers,
            body,
            read_timeout,
            ..
        } = request;

        debug!(%method, %url, "Sending request");

        let mut builder = client.request(method, &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        let activity = Activity::start();
        if let Some(body) = body {
            builder = match body {
                RequestBody::Bytes(bytes) => builder.body(bytes),
                RequestBody::Stream(stream) => {
                    let progress = activity.clone();
                    let stream = stream.inspect_ok(move |_| progress.touch());
                    builder.body(reqwest::Body::wrap_stream(stream))
                }
            };
        }

        let response = within_idle_timeout(read_timeout, &activity, builder.send())
            .await?
            .map_err(|e| ErrorClassifier.from_transport(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        debug!(status, %url, "Received response");

        let body = response
            .bytes_stream()
            .map_err(|e| ErrorClassifier.from_transport(&e));

        Ok(ResponseEnvelope::new(
            status,
            headers,
            ResponseBody::new(idle_body(Box::pin(body), read_timeout)),
        ))
    }

    async fn shutdown(&self) {
        let client = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        // Pooled connections close once in-flight clones are dropped
        if client.is_some() {
            debug!("HTTP transport shut down");
        }
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

/// Shared `reqwest` client setup: no redirects, user agent, pool size and
/// connect timeout
pub(crate) fn build_client(config: &TransportConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .redirect(redirect::Policy::none())
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(config.pool_max_idle_per_host);

    if !config.connect_timeout.is_zero() {
        builder = builder.connect_timeout(config.connect_timeout);
    }

    builder
        .build()
        .map_err(|e| Error::transport(format!("Failed to build HTTP client: {e}")))
}

// ============================================================================
// Inactivity timeout
// ============================================================================

/// Last time bytes moved for one exchange
#[derive(Clone)]
pub(crate) struct Activity(Arc<Mutex<Instant>>);

impl Activity {
    pub(crate) fn start() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    fn touch(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn last(&self) -> Instant {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn idle_timeout_error(idle: Duration) -> Error {
    let timed_out = std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("Read timed out: no data for {}ms", idle.as_millis()),
    );
    ErrorClassifier.from_transport(&timed_out)
}

/// Await `future`, failing once `idle` passes without `activity` moving.
/// A zero `idle` waits forever.
pub(crate) async fn within_idle_timeout<F: Future>(
    idle: Duration,
    activity: &Activity,
    future: F,
) -> Result<F::Output> {
    if idle.is_zero() {
        return Ok(future.await);
    }

    tokio::pin!(future);
    loop {
        let deadline = activity.last() + idle;
        tokio::select! {
            output = &mut future => return Ok(output),
            () = tokio::time::sleep_until(deadline) => {
                if activity.last() + idle <= Instant::now() {
                    return Err(idle_timeout_error(idle));
                }
            }
        }
    }
}

/// Body stream where every chunk must arrive within `idle` of the previous one
pub(crate) fn idle_body(
    body: BoxStream<'static, Result<Bytes>>,
    idle: Duration,
) -> BoxStream<'static, Result<Bytes>> {
    if idle.is_zero() {
        return body;
    }

    futures::stream::unfold(Some(body), move |state| async move {
        let mut body = state?;
        match tokio::time::timeout(idle, body.next()).await {
            Ok(Some(chunk)) => Some((chunk, Some(body))),
            Ok(None) => None,
            // The stream ends after reporting the timeout.
            Err(_) => Some((Err(idle_timeout_error(idle)), None)),
        }
    })
    .boxed()
}
