//! Service settings
//!
//! Settings arrive as a loosely-typed [`SettingsSource`] (JSON settings file,
//! environment variables, or plain struct literal) and are validated exactly
//! once into an immutable [`ServiceSettings`].

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::types::{
    Region, DEFAULT_AUTHORITY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_SCOPE,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Raw settings
// ============================================================================

/// Unvalidated settings, keyed the way the platform's settings files are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettingsSource {
    /// Directory (tenant) id
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Application (client) id
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Token scope
    #[serde(default)]
    pub audience: Option<String>,

    /// Connector API base URL
    #[serde(default)]
    pub connector_api_url: Option<String>,

    /// Region, used when no explicit base URL is given
    #[serde(default)]
    pub region: Option<Region>,

    /// Registered connector id
    #[serde(default)]
    pub connector_id: Option<String>,

    /// Identity provider authority
    #[serde(default)]
    pub authority: Option<String>,

    /// Connect timeout in milliseconds (0 = none)
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds (0 = none)
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

impl SettingsSource {
    /// Load settings from a JSON settings file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read settings file {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse settings from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::config(format!("Invalid settings JSON: {e}")))
    }

    /// Read settings from `RECORDS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = lookup("RECORDS_REGION")
            .map(|value| value.parse::<Region>())
            .transpose()?;

        Ok(Self {
            tenant_id: lookup("RECORDS_TENANT_ID"),
            client_id: lookup("RECORDS_CLIENT_ID"),
            client_secret: lookup("RECORDS_CLIENT_SECRET"),
            audience: lookup("RECORDS_SCOPE"),
            connector_api_url: lookup("RECORDS_API_URL"),
            region,
            connector_id: lookup("RECORDS_CONNECTOR_ID"),
            authority: lookup("RECORDS_AUTHORITY"),
            connect_timeout_ms: parse_millis(&lookup, "RECORDS_CONNECT_TIMEOUT_MS")?,
            read_timeout_ms: parse_millis(&lookup, "RECORDS_READ_TIMEOUT_MS")?,
        })
    }

    /// Fill fields missing here from `other`
    #[must_use]
    pub fn or(self, other: SettingsSource) -> Self {
        Self {
            tenant_id: self.tenant_id.or(other.tenant_id),
            client_id: self.client_id.or(other.client_id),
            client_secret: self.client_secret.or(other.client_secret),
            audience: self.audience.or(other.audience),
            connector_api_url: self.connector_api_url.or(other.connector_api_url),
            region: self.region.or(other.region),
            connector_id: self.connector_id.or(other.connector_id),
            authority: self.authority.or(other.authority),
            connect_timeout_ms: self.connect_timeout_ms.or(other.connect_timeout_ms),
            read_timeout_ms: self.read_timeout_ms.or(other.read_timeout_ms),
        }
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| Error::invalid_value(key, e.to_string()))
        })
        .transpose()
}

// ============================================================================
// Validated settings
// ============================================================================

/// Validated, immutable service settings
#[derive(Clone)]
pub struct ServiceSettings {
    base_url: Url,
    authority: Url,
    credentials: Credentials,
    connector_id: Option<String>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl ServiceSettings {
    /// Validate raw settings, rejecting missing required fields
    pub fn new(source: SettingsSource) -> Result<Self> {
        let tenant_id = required(source.tenant_id, "TenantId")?;
        let client_id = required(source.client_id, "ClientId")?;
        let secret = required(source.client_secret, "ClientSecret")?;
        let scope = non_blank(source.audience).unwrap_or_else(|| DEFAULT_SCOPE.to_string());

        let base_url = match (non_blank(source.connector_api_url), source.region) {
            (Some(url), _) => parse_url(&url, "ConnectorApiUrl")?,
            (None, Some(region)) => parse_url(region.url(), "Region")?,
            (None, None) => return Err(Error::missing_field("ConnectorApiUrl")),
        };

        let authority = match non_blank(source.authority) {
            Some(url) => parse_url(&url, "Authority")?,
            None => parse_url(DEFAULT_AUTHORITY, "Authority")?,
        };

        Ok(Self {
            base_url,
            authority,
            credentials: Credentials::new(tenant_id, client_id, secret, scope),
            connector_id: non_blank(source.connector_id),
            connect_timeout: source
                .connect_timeout_ms
                .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_millis),
            read_timeout: source
                .read_timeout_ms
                .map_or(DEFAULT_READ_TIMEOUT, Duration::from_millis),
        })
    }

    /// Load and validate a JSON settings file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(SettingsSource::from_json_file(path)?)
    }

    /// Load and validate settings from the environment
    pub fn from_env() -> Result<Self> {
        Self::new(SettingsSource::from_env()?)
    }

    /// Connector API base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Identity provider authority
    pub fn authority(&self) -> &Url {
        &self.authority
    }

    /// Client credentials for the token exchange
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Registered connector id, when configured
    pub fn connector_id(&self) -> Option<&str> {
        self.connector_id.as_deref()
    }

    /// Connect timeout (zero = none)
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Read timeout (zero = none)
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

impl std::fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("base_url", &self.base_url.as_str())
            .field("authority", &self.authority.as_str())
            .field("credentials", &self.credentials)
            .field("connector_id", &self.connector_id)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| Error::missing_field(field))
}

fn parse_url(raw: &str, field: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::invalid_value(field, e.to_string()))
}
