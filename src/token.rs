use crate::error::{Result, SchwabError};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime the authorization server grants a refresh token (7 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Token represents one OAuth2 credential pair issued by the authorization server.
///
/// A token is never mutated once issued; a successful refresh replaces it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Bearer credential for API calls
    pub access_token: String,

    /// Credential used to mint new access tokens
    pub refresh_token: String,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Space-delimited granted scopes
    pub scope: String,

    /// OIDC identity token, not used for authorization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Access token lifetime in seconds, as declared at issuance
    pub expires_in: i64,

    /// Issuance time; stamped locally when the payload does not carry one
    #[serde(
        rename = "created_timestamp",
        with = "crate::time::epoch_seconds",
        default = "crate::time::now"
    )]
    pub created_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Where a token sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No token has been loaded yet
    Uninitialized,
    /// Access token usable
    Valid,
    /// Access token stale, refresh token still usable
    AccessExpired,
    /// Refresh token stale too; only a new authorization-code exchange helps
    FullyExpired,
}

impl Token {
    /// Create a new Token issued now
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Token {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            scope: String::new(),
            id_token: None,
            expires_in,
            created_at: crate::time::now(),
        }
    }

    /// Set the granted scopes
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the OIDC identity token
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Set the token type
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Set the issuance time, truncated to the persisted microsecond precision
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at.trunc_subsecs(6);
        self
    }

    /// Parse a token from a token-endpoint response or a persisted record.
    ///
    /// A missing `created_timestamp` means the token was just issued.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let token: Token =
            serde_json::from_slice(bytes).map_err(|e| SchwabError::MalformedToken(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(SchwabError::MalformedToken("empty access_token".to_string()));
        }
        if token.refresh_token.is_empty() {
            return Err(SchwabError::MalformedToken("empty refresh_token".to_string()));
        }

        Ok(token)
    }

    /// Time elapsed since issuance
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Whether the access token is usable at `now`
    pub fn is_access_token_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now).num_milliseconds() < self.expires_in.saturating_mul(1000)
    }

    /// Whether the refresh token is usable at `now`
    pub fn is_refresh_token_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now).num_milliseconds() < REFRESH_TOKEN_TTL_SECS * 1000
    }

    /// Whether the access token is usable right now
    pub fn is_access_token_valid(&self) -> bool {
        self.is_access_token_valid_at(Utc::now())
    }

    /// Whether the refresh token is usable right now
    pub fn is_refresh_token_valid(&self) -> bool {
        self.is_refresh_token_valid_at(Utc::now())
    }

    /// Whether both tokens are past their lifetime
    pub fn all_tokens_invalid(&self) -> bool {
        let now = Utc::now();
        !self.is_access_token_valid_at(now) && !self.is_refresh_token_valid_at(now)
    }

    /// Lifecycle state at `now`
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.is_access_token_valid_at(now) {
            TokenState::Valid
        } else if self.is_refresh_token_valid_at(now) {
            TokenState::AccessExpired
        } else {
            TokenState::FullyExpired
        }
    }

    /// Value for the `Authorization` header, e.g. `Bearer abc123`
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Granted scopes as a list
    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split_whitespace().collect()
    }
}

// Implement Debug manually to avoid exposing the credentials
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("created_at", &self.created_at)
            .finish()
    }
}
