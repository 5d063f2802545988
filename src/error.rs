//! Error types for the connector SDK
//!
//! Every public API returns `Result<T, Error>`. Each variant carries the
//! HTTP status code that produced it (or -1 when no response was received),
//! a short title, and a human-readable detail string.

use thiserror::Error;

/// Status code reported when no HTTP response was received.
pub const NO_STATUS: i32 = -1;

/// Detail attached to every 401/403 classification.
pub const UNAUTHORIZED_DETAIL: &str = "Unauthorized Token";

/// Title used when the API returned a structured `{error:{message}}` body.
pub const API_ERROR_TITLE: &str = "API Error";

/// Title used when the error body could not be interpreted.
pub const UNEXPECTED_ERROR_TITLE: &str = "Unexpected Error";

/// The main error type for the connector SDK
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    /// The identity provider rejected the credential exchange.
    #[error("Authentication failed ({status}): {detail}")]
    Auth { status: i32, detail: String },

    /// The API answered 401 or 403.
    #[error("HTTP {status}: {detail}")]
    Forbidden { status: u16, detail: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Any other non-2xx response.
    #[error("HTTP {status} {title}: {detail}")]
    Api {
        status: u16,
        title: String,
        detail: String,
    },

    /// Connection, DNS, TLS or body I/O failure before a response arrived.
    #[error("Transport error: {detail}")]
    Transport { detail: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to map JSON for {type_name}: {detail}")]
    Mapper { type_name: String, detail: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(status: i32, detail: impl Into<String>) -> Self {
        Self::Auth {
            status,
            detail: detail.into(),
        }
    }

    /// Create a forbidden/unauthorized error
    pub fn forbidden(status: u16) -> Self {
        Self::Forbidden {
            status,
            detail: UNAUTHORIZED_DETAIL.to_string(),
        }
    }

    /// Create an API error
    pub fn api(status: u16, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// Create a transport error
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Create a mapper error for the given target type
    pub fn mapper(type_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Mapper {
            type_name: type_name.into(),
            detail: detail.into(),
        }
    }

    /// HTTP status code behind this error, or -1 when no response was received
    pub fn status_code(&self) -> i32 {
        match self {
            Error::Auth { status, .. } => *status,
            Error::Forbidden { status, .. } | Error::Api { status, .. } => i32::from(*status),
            _ => NO_STATUS,
        }
    }

    /// Short title for the error kind
    pub fn title(&self) -> &str {
        match self {
            Error::Api { title, .. } => title,
            Error::Forbidden { .. } => "Unauthorized",
            Error::Auth { .. } => "Authentication Error",
            Error::Transport { .. } | Error::Io(_) => UNEXPECTED_ERROR_TITLE,
            Error::Mapper { .. } => "Mapping Error",
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. } => "Configuration Error",
        }
    }

    /// Human-readable detail
    pub fn detail(&self) -> String {
        match self {
            Error::Auth { detail, .. }
            | Error::Forbidden { detail, .. }
            | Error::Api { detail, .. }
            | Error::Transport { detail }
            | Error::Mapper { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Check if this error is a 401/403 classification
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Forbidden { .. })
    }
}

/// Result type alias for the connector SDK
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("TenantId");
        assert_eq!(err.to_string(), "Missing required config field: TenantId");

        let err = Error::api(404, API_ERROR_TITLE, "Not found");
        assert_eq!(err.to_string(), "HTTP 404 API Error: Not found");

        let err = Error::forbidden(403);
        assert_eq!(err.to_string(), "HTTP 403: Unauthorized Token");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::api(500, API_ERROR_TITLE, "x").status_code(), 500);
        assert_eq!(Error::forbidden(401).status_code(), 401);
        assert_eq!(Error::auth(400, "invalid_client").status_code(), 400);
        assert_eq!(Error::transport("connection refused").status_code(), -1);
        assert_eq!(Error::mapper("Token", "eof").status_code(), -1);
        assert_eq!(Error::config("bad").status_code(), -1);
    }

    #[test]
    fn test_title_and_detail() {
        let err = Error::api(500, UNEXPECTED_ERROR_TITLE, "oops");
        assert_eq!(err.title(), "Unexpected Error");
        assert_eq!(err.detail(), "oops");

        let err = Error::forbidden(403);
        assert_eq!(err.detail(), UNAUTHORIZED_DETAIL);
        assert!(err.is_forbidden());

        let err = Error::transport("dns failure");
        assert_eq!(err.detail(), "dns failure");
        assert!(!err.is_forbidden());
    }
}
