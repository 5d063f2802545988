// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Records Connector SDK
//!
//! Client library for connectors that push content into a records
//! management platform through its connector API.
//!
//! ## Features
//!
//! - **Client-credentials auth**: one shared, lazily refreshed bearer token
//! - **Single auth retry**: a 401/403 drops the token and replays the request once
//! - **Typed errors**: transport, auth, API and mapping failures are distinct
//! - **Resource clients**: aggregations, items, audit events, binaries,
//!   notifications and connector configurations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use records_connector_sdk::{ConnectorClient, ServiceSettings, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = ServiceSettings::from_json_file("appsettings.json")?;
//!     let client = ConnectorClient::new(settings)?;
//!
//!     for notification in client.notifications().list("my-connector").await? {
//!         // Process notification
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ConnectorClient                          │
//! │  aggregations() items() audit_events() binaries() notifications │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │                  AuthenticatedRequestExecutor                   │
//! │      bearer token ─ send ─ 401/403: reset + retry once          │
//! └──────────┬───────────────────┬──────────────────────┬───────────┘
//!            │                   │                      │
//! ┌──────────┴───────┐ ┌─────────┴─────────┐ ┌──────────┴──────────┐
//! │    TokenCache    │ │     Transport     │ │   ErrorClassifier   │
//! │ CredentialBroker │ │  ReqwestTransport │ │     JsonMapper      │
//! └──────────────────┘ └───────────────────┘ └─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and defaults
pub mod types;

/// Settings loading and validation
pub mod config;

/// Token acquisition and caching
pub mod auth;

/// Transport, error classification and the authenticated executor
pub mod http;

/// JSON mapping
pub mod decode;

/// Resource clients and wire models
pub mod service;

/// Connector client facade
pub mod client;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{ClientCredentialsBroker, CredentialBroker, Credentials, Token, TokenCache};
pub use client::ConnectorClient;
pub use config::{ServiceSettings, SettingsSource};
pub use error::{Error, Result};
pub use http::{AuthenticatedRequestExecutor, ReqwestTransport, Transport};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
