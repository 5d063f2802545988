//! Authentication module
//!
//! Client-credentials token acquisition and caching.
//!
//! The [`CredentialBroker`] performs the exchange with the identity provider;
//! the [`TokenCache`] decides when an exchange is needed and shares the
//! resulting token across all callers.

mod broker;
mod cache;
mod clock;
mod types;

pub use broker::{ClientCredentialsBroker, CredentialBroker};
pub use cache::{TokenCache, TokenState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{Credentials, Token};
