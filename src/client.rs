//! Connector client facade
//!
//! [`ConnectorClient`] wires settings, transport, broker, token cache and
//! executor together and hands out the resource clients. It is an ordinary
//! owned value: build one per connector process and share it by reference or
//! `Arc`.

use crate::auth::{ClientCredentialsBroker, CredentialBroker, TokenCache};
use crate::config::ServiceSettings;
use crate::error::Result;
use crate::http::{AuthenticatedRequestExecutor, ReqwestTransport, Transport, TransportConfig};
use crate::service::{
    AggregationClient, AuditEventClient, BinaryClient, ConnectorConfigClient, ItemClient,
    NotificationClient, ServiceContext,
};
use std::sync::Arc;
use tracing::debug;

/// Entry point to the connector API
#[derive(Debug, Clone)]
pub struct ConnectorClient {
    settings: ServiceSettings,
    context: ServiceContext,
}

impl ConnectorClient {
    /// Build a client with the default `reqwest` transport and
    /// client-credentials broker
    pub fn new(settings: ServiceSettings) -> Result<Self> {
        let config = TransportConfig {
            connect_timeout: settings.connect_timeout(),
            ..TransportConfig::default()
        };
        let transport = ReqwestTransport::with_config(&config)?;
        let broker = ClientCredentialsBroker::with_config(settings.authority().clone(), &config)?
            .with_read_timeout(settings.read_timeout());
        Ok(Self::with_parts(
            settings,
            Arc::new(transport),
            Arc::new(broker),
        ))
    }

    /// Build a client over an injected transport and broker
    pub fn with_parts(
        settings: ServiceSettings,
        transport: Arc<dyn Transport>,
        broker: Arc<dyn CredentialBroker>,
    ) -> Self {
        let tokens = Arc::new(TokenCache::new(settings.credentials().clone(), broker));
        let executor = AuthenticatedRequestExecutor::new(transport, tokens)
            .with_timeouts(settings.connect_timeout(), settings.read_timeout());
        let context = ServiceContext::new(Arc::new(executor), settings.base_url().clone());

        debug!(base_url = %settings.base_url(), "Connector client ready");
        Self { settings, context }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn executor(&self) -> &AuthenticatedRequestExecutor {
        self.context.executor()
    }

    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    pub fn aggregations(&self) -> AggregationClient {
        AggregationClient::new(self.context.clone())
    }

    pub fn items(&self) -> ItemClient {
        ItemClient::new(self.context.clone())
    }

    pub fn audit_events(&self) -> AuditEventClient {
        AuditEventClient::new(self.context.clone())
    }

    pub fn binaries(&self) -> BinaryClient {
        BinaryClient::new(self.context.clone())
    }

    pub fn notifications(&self) -> NotificationClient {
        NotificationClient::new(self.context.clone())
    }

    pub fn connector_configs(&self) -> ConnectorConfigClient {
        ConnectorConfigClient::new(self.context.clone())
    }

    /// Shut down the transport and the token cache's broker
    ///
    /// Requests issued afterwards fail with a transport error.
    pub async fn close(&self) {
        let executor = self.context.executor();
        executor.transport().shutdown().await;
        executor.token_cache().close().await;
        debug!("Connector client closed");
    }
}
