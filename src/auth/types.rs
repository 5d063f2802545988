//! Credential and token value types

use chrono::{DateTime, Utc};

/// Client credentials for the identity provider exchange
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    tenant_id: String,
    client_id: String,
    secret: String,
    scope: String,
}

impl Credentials {
    /// Create a credentials value
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            secret: secret.into(),
            scope: scope.into(),
        }
    }

    /// Directory (tenant) id
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Application (client) id
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Requested scope
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Bearer token issued by the identity provider
///
/// Immutable once issued; the cache replaces it wholesale on refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    token_type: String,
    expires_at: DateTime<Utc>,
    scope: String,
}

impl Token {
    /// Create a token value
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at,
            scope: scope.into(),
        }
    }

    /// The bearer credential
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Token type reported by the provider (normally `Bearer`)
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Expiry as epoch seconds
    pub fn expires_at_epoch(&self) -> i64 {
        self.expires_at.timestamp()
    }

    /// Scope the token was issued for
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Expired when `now >= expires_at`; no grace window
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_token_not_expired_before_deadline() {
        let token = Token::new("abc", "Bearer", t0() + Duration::seconds(3600), "scope");
        assert!(!token.is_expired_at(t0() + Duration::seconds(10)));
        assert!(!token.is_expired_at(t0() + Duration::seconds(3599)));
    }

    #[test]
    fn test_token_expired_at_exact_deadline() {
        let token = Token::new("abc", "Bearer", t0() + Duration::seconds(3600), "scope");
        assert!(token.is_expired_at(t0() + Duration::seconds(3600)));
        assert!(token.is_expired_at(t0() + Duration::seconds(3601)));
    }

    #[test]
    fn test_token_epoch() {
        let token = Token::new("abc", "Bearer", t0(), "scope");
        assert_eq!(token.expires_at_epoch(), 1_700_000_000);
    }

    #[test]
    fn test_debug_redacts() {
        let token = Token::new("super-secret-token", "Bearer", t0(), "scope");
        assert!(!format!("{token:?}").contains("super-secret-token"));

        let creds = Credentials::new("t", "c", "hunter2", "s");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
