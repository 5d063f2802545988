//! Shared token cache
//!
//! One cached [`Token`] guarded by an async mutex. The mutex is held across
//! the broker call, so concurrent callers that find the cache empty or
//! expired queue behind the first refresh and then re-check validity.

use super::broker::CredentialBroker;
use super::clock::{Clock, SystemClock};
use super::types::{Credentials, Token};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Observable cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No token fetched yet
    Empty,
    /// Cached token still valid
    Valid,
    /// Cached token past its expiry
    Expired,
}

/// Serves a currently valid access token to many concurrent callers
pub struct TokenCache {
    credentials: Credentials,
    broker: Arc<dyn CredentialBroker>,
    clock: Arc<dyn Clock>,
    current: Mutex<Option<Token>>,
}

impl TokenCache {
    /// Create an empty cache
    pub fn new(credentials: Credentials, broker: Arc<dyn CredentialBroker>) -> Self {
        Self::with_clock(credentials, broker, Arc::new(SystemClock))
    }

    /// Create an empty cache with a custom clock
    pub fn with_clock(
        credentials: Credentials,
        broker: Arc<dyn CredentialBroker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            broker,
            clock,
            current: Mutex::new(None),
        }
    }

    /// Current access token, fetching a new one when empty or expired
    pub async fn access_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if !token.is_expired_at(self.clock.now()) {
                debug!("Using cached access token");
                return Ok(token.access_token().to_string());
            }
            debug!(expired_at = %token.expires_at(), "Cached access token expired");
        }

        let token = self.broker.fetch_token(&self.credentials).await?;
        let access_token = token.access_token().to_string();
        *current = Some(token);
        Ok(access_token)
    }

    /// Unconditionally fetch a new token and replace the cached one
    pub async fn reset_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;
        debug!("Forcing access token refresh");

        let token = self.broker.fetch_token(&self.credentials).await?;
        let access_token = token.access_token().to_string();
        *current = Some(token);
        Ok(access_token)
    }

    /// Snapshot of the cached token, if any
    pub async fn current_token(&self) -> Option<Token> {
        self.current.lock().await.clone()
    }

    /// Current cache state
    pub async fn state(&self) -> TokenState {
        match self.current.lock().await.as_ref() {
            None => TokenState::Empty,
            Some(token) if token.is_expired_at(self.clock.now()) => TokenState::Expired,
            Some(_) => TokenState::Valid,
        }
    }

    /// Credentials the cache exchanges
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Release the broker's resources. Idempotent.
    pub async fn close(&self) {
        self.broker.close().await;
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
