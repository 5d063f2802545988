//! Client-credentials token exchange
//!
//! [`ClientCredentialsBroker`] performs the OAuth2 client-credentials grant
//! against the identity provider. Every exchange is funnelled through one
//! background worker task, so a burst of cache refreshes produces a queue of
//! sequential provider calls instead of a stampede.

use super::clock::{Clock, SystemClock};
use super::types::{Credentials, Token};
use crate::error::{Error, Result, NO_STATUS};
use crate::http::{
    build_client, idle_body, within_idle_timeout, Activity, ErrorClassifier, TransportConfig,
};
use crate::types::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::TryStreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

/// Pending exchanges the worker will accept before callers wait to enqueue
const WORKER_QUEUE_DEPTH: usize = 32;

/// Exchanges credentials for a bearer token
///
/// Implementations must not cache; caching is the job of
/// [`TokenCache`](super::TokenCache).
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Perform one credential exchange
    async fn fetch_token(&self, credentials: &Credentials) -> Result<Token>;

    /// Release background resources. Must be idempotent.
    async fn close(&self) {}
}

/// Broker for the client-credentials grant (`/{tenant}/oauth2/v2.0/token`)
pub struct ClientCredentialsBroker {
    exchange: TokenExchange,
    worker: Mutex<Option<Worker>>,
}

struct Worker {
    jobs: mpsc::Sender<Job>,
    handle: JoinHandle<()>,
}

struct Job {
    credentials: Credentials,
    reply: oneshot::Sender<Result<Token>>,
}

impl ClientCredentialsBroker {
    /// Create a broker talking to `authority` with the default timeouts
    pub fn new(authority: Url) -> Result<Self> {
        let config = TransportConfig {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ..TransportConfig::default()
        };
        Self::with_config(authority, &config)
    }

    /// Create a broker whose client is built like the API transport's
    pub fn with_config(authority: Url, config: &TransportConfig) -> Result<Self> {
        Ok(Self::with_client(authority, build_client(config)?))
    }

    /// Create a broker with a custom HTTP client. The caller is responsible
    /// for its redirect policy and connect timeout.
    pub fn with_client(authority: Url, http_client: Client) -> Self {
        Self {
            exchange: TokenExchange {
                http_client,
                authority,
                clock: Arc::new(SystemClock),
                read_timeout: DEFAULT_READ_TIMEOUT,
            },
            worker: Mutex::new(None),
        }
    }

    /// Inactivity timeout for the provider exchange (zero = none)
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: std::time::Duration) -> Self {
        self.exchange.read_timeout = read_timeout;
        self
    }

    /// Replace the clock used to compute expiry from `expires_in`
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.exchange.clock = clock;
        self
    }

    /// Token endpoint for a tenant
    pub fn token_url(&self, tenant_id: &str) -> String {
        self.exchange.token_url(tenant_id)
    }

    /// Whether the background worker is currently running
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Sender for the running worker, spawning one if needed
    async fn jobs(&self) -> mpsc::Sender<Job> {
        let mut worker = self.worker.lock().await;
        if let Some(existing) = worker.as_ref() {
            if !existing.handle.is_finished() && !existing.jobs.is_closed() {
                return existing.jobs.clone();
            }
        }

        debug!("Starting credential exchange worker");
        let (jobs, queue) = mpsc::channel(WORKER_QUEUE_DEPTH);
        let handle = tokio::spawn(run_worker(queue, self.exchange.clone()));
        *worker = Some(Worker {
            jobs: jobs.clone(),
            handle,
        });
        jobs
    }
}

#[async_trait]
impl CredentialBroker for ClientCredentialsBroker {
    async fn fetch_token(&self, credentials: &Credentials) -> Result<Token> {
        let jobs = self.jobs().await;
        let (reply, response) = oneshot::channel();

        jobs.send(Job {
            credentials: credentials.clone(),
            reply,
        })
        .await
        .map_err(|_| Error::auth(NO_STATUS, "Credential exchange worker is not running"))?;

        response
            .await
            .map_err(|_| Error::auth(NO_STATUS, "Credential exchange worker stopped unexpectedly"))?
    }

    async fn close(&self) {
        let worker = self.worker.lock().await.take();
        if let Some(Worker { jobs, handle }) = worker {
            // Queued exchanges drain before the loop sees the closed channel.
            drop(jobs);
            let _ = handle.await;
            debug!("Credential exchange worker stopped");
        }
    }
}

impl std::fmt::Debug for ClientCredentialsBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsBroker")
            .field("authority", &self.exchange.authority.as_str())
            .finish_non_exhaustive()
    }
}

async fn run_worker(mut queue: mpsc::Receiver<Job>, exchange: TokenExchange) {
    while let Some(job) = queue.recv().await {
        let result = exchange.request(&job.credentials).await;
        // The caller may have given up waiting; nothing to do then.
        let _ = job.reply.send(result);
    }
}

// ============================================================================
// Wire exchange
// ============================================================================

#[derive(Clone)]
struct TokenExchange {
    http_client: Client,
    authority: Url,
    clock: Arc<dyn Clock>,
    read_timeout: std::time::Duration,
}

impl TokenExchange {
    fn token_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.as_str().trim_end_matches('/'),
            tenant_id
        )
    }

    async fn request(&self, credentials: &Credentials) -> Result<Token> {
        let url = self.token_url(credentials.tenant_id());
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id()),
            ("client_secret", credentials.secret()),
            ("scope", credentials.scope()),
        ];

        debug!(tenant = credentials.tenant_id(), "Requesting access token");

        let send = self.http_client.post(&url).form(&form).send();
        let response = within_idle_timeout(self.read_timeout, &Activity::start(), send)
            .await?
            .map_err(|e| ErrorClassifier.from_transport(&e))?;

        let status = response.status();
        let stream = response
            .bytes_stream()
            .map_err(|e| ErrorClassifier.from_transport(&e));
        let bytes = idle_body(Box::pin(stream), self.read_timeout)
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok::<_, Error>(acc)
            })
            .await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if !status.is_success() {
            return Err(Error::auth(
                i32::from(status.as_u16()),
                provider_message(&body),
            ));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::mapper("TokenResponse", e.to_string()))?;

        if token_response.access_token.is_empty() {
            return Err(Error::auth(
                i32::from(status.as_u16()),
                "Identity provider returned an empty access token",
            ));
        }

        let token = token_response.into_token(credentials.scope(), self.clock.now());
        info!(expires_at = %token.expires_at(), "Acquired access token");
        Ok(token)
    }
}

/// Provider error message, verbatim when the body is not the standard shape
fn provider_message(body: &str) -> String {
    match serde_json::from_str::<ProviderError>(body) {
        Ok(ProviderError {
            error_description: Some(description),
            ..
        }) => description,
        Ok(ProviderError {
            error: Some(error), ..
        }) => error,
        _ => body.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Identity provider token response. Some endpoints send numbers as strings.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<NumberOrString>,
    #[serde(default)]
    expires_on: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl TokenResponse {
    fn into_token(self, scope: &str, now: DateTime<Utc>) -> Token {
        let expires_at = self
            .expires_on
            .as_ref()
            .and_then(NumberOrString::as_i64)
            .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single())
            .or_else(|| {
                self.expires_in
                    .as_ref()
                    .and_then(NumberOrString::as_i64)
                    .map(|secs| now + Duration::seconds(secs))
            })
            // No expiry reported: treat as already stale so the next call refreshes.
            .unwrap_or(now);

        Token::new(
            self.access_token,
            self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
            scope,
        )
    }
}

#[cfg(test)]
mod broker_tests {
    use super::*;

    #[test]
    fn test_provider_message_prefers_description() {
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret"}"#;
        assert_eq!(provider_message(body), "AADSTS7000215: Invalid client secret");

        let body = r#"{"error":"unauthorized_client"}"#;
        assert_eq!(provider_message(body), "unauthorized_client");

        assert_eq!(provider_message("gateway down"), "gateway down");
    }

    #[test]
    fn test_token_response_expires_in() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":3599}"#,
        )
        .unwrap();
        let token = response.into_token("scope", now);
        assert_eq!(token.expires_at_epoch(), 4_599);
        assert_eq!(token.token_type(), "Bearer");
    }

    #[test]
    fn test_token_response_string_numbers() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","expires_in":"3600","expires_on":"9000"}"#,
        )
        .unwrap();
        let token = response.into_token("scope", now);
        assert_eq!(token.expires_at_epoch(), 9_000);
    }

    #[test]
    fn test_token_url() {
        let broker =
            ClientCredentialsBroker::new(Url::parse("https://login.example.com/").unwrap())
                .unwrap();
        assert_eq!(
            broker.token_url("tenant-1"),
            "https://login.example.com/tenant-1/oauth2/v2.0/token"
        );
    }
}
