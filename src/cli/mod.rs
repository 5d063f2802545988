//! CLI module
//!
//! Command-line client for the connector API.
//!
//! # Commands
//!
//! - `token` - Acquire an access token (prints type and expiry only)
//! - `get` - Authenticated GET of any API resource
//! - `notifications` - List pending notifications for a connector

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
