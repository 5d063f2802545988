//! Common types used throughout the connector SDK
//!
//! Shared type aliases, well-known defaults, and the static region lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Defaults
// ============================================================================

/// Token scope requested when the settings do not name one
pub const DEFAULT_SCOPE: &str = "https://management.azure.com/.default";

/// Identity provider authority used for the client-credentials grant
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Default time allowed to establish a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default time allowed to receive a response
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default `User-Agent` header
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Region
// ============================================================================

/// Hosted platform regions and their connector API base URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    /// Australia East
    Aue,
    /// Canada Central
    Cac,
    /// UK South
    Uks,
    /// US West
    Usw,
}

impl Region {
    /// Connector API base URL for the region
    pub fn url(self) -> &'static str {
        match self {
            Region::Aue => "https://connector-aue.records365.com.au",
            Region::Cac => "https://connector-cac.records365.ca",
            Region::Uks => "https://connector-uks.records365.co.uk",
            Region::Usw => "https://connector-usw.records365.com",
        }
    }
}

impl FromStr for Region {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUE" => Ok(Region::Aue),
            "CAC" => Ok(Region::Cac),
            "UKS" => Ok(Region::Uks),
            "USW" => Ok(Region::Usw),
            other => Err(crate::Error::invalid_value(
                "Region",
                format!("unknown region '{other}'"),
            )),
        }
    }
}
