use crate::response::ErrorMessage;
use thiserror::Error;

/// Main error type for Schwab API operations
#[derive(Debug, Error)]
pub enum SchwabError {
    /// No token in memory or in the store; the authorization-code flow must run first
    #[error("tokens are not available in {store}; run the authorization-code flow first")]
    TokensUnavailable { store: String },

    /// Token refresh was attempted and did not succeed
    #[error("token refresh failed after {attempts} attempt(s): {reason}")]
    RefreshFailed { attempts: u32, reason: RefreshFailure },

    /// Token failure hit while starting an API call
    #[error("{operation}: {source}")]
    Auth {
        operation: String,
        #[source]
        source: Box<SchwabError>,
    },

    /// Token payload did not match the expected schema
    #[error("malformed token payload: {0}")]
    MalformedToken(String),

    /// Error returned by an API endpoint
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
        body: String,
    },

    /// Required configuration value is missing
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Reason a refresh attempt failed.
///
/// Cloneable so that one shared refresh outcome can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// Token endpoint answered with a non-200 status
    #[error("token endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Timeout, connection refused/reset and friends
    #[error("transport error: {0}")]
    Transport(String),

    /// 200 response whose body is not a token
    #[error("malformed token response: {0}")]
    Malformed(String),

    /// Refresh token is past its lifetime
    #[error("refresh token has expired")]
    RefreshTokenExpired,
}

impl SchwabError {
    /// Create an API error from a failed response body.
    ///
    /// Uses the broker's `{"message": .., "errors": [..]}` body for the message
    /// when it parses, the raw body otherwise.
    pub fn api(operation: impl Into<String>, status: u16, body: String) -> Self {
        let message = match serde_json::from_str::<ErrorMessage>(&body) {
            Ok(err) => err.summary(),
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.clone(),
        };

        SchwabError::Api {
            operation: operation.into(),
            status,
            message,
            body,
        }
    }

    /// Attach the failed operation to a token error
    pub fn auth(operation: impl Into<String>, source: SchwabError) -> Self {
        SchwabError::Auth {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Whether the caller must re-run the interactive authorization flow
    pub fn is_reauthorization_required(&self) -> bool {
        match self {
            SchwabError::Auth { source, .. } => source.is_reauthorization_required(),
            SchwabError::TokensUnavailable { .. } => true,
            SchwabError::RefreshFailed { reason, .. } => matches!(
                reason,
                RefreshFailure::RefreshTokenExpired | RefreshFailure::Rejected { .. }
            ),
            _ => false,
        }
    }

    /// Get the HTTP status code if this error carries one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SchwabError::Auth { source, .. } => source.status_code(),
            SchwabError::Api { status, .. } => Some(*status),
            SchwabError::RefreshFailed {
                reason: RefreshFailure::Rejected { status, .. },
                ..
            } => Some(*status),
            SchwabError::Reqwest(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for Schwab API operations
pub type Result<T> = std::result::Result<T, SchwabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_broker_message() {
        let body = r#"{"message": "Invalid account", "errors": ["hash not found"]}"#;
        let error = SchwabError::api("get accounts", 400, body.to_string());

        match &error {
            SchwabError::Api { message, status, .. } => {
                assert_eq!(*status, 400);
                assert!(message.contains("Invalid account"));
                assert!(message.contains("hash not found"));
            }
            other => panic!("expected SchwabError::Api, got {:?}", other),
        }
        assert_eq!(error.status_code(), Some(400));
    }

    #[test]
    fn test_api_error_keeps_opaque_body() {
        let error = SchwabError::api("cancel order", 502, "Bad Gateway".to_string());
        assert!(error.to_string().contains("Bad Gateway"));
        assert!(error.to_string().contains("cancel order"));
    }

    #[test]
    fn test_reauthorization_required() {
        let unavailable = SchwabError::TokensUnavailable {
            store: "tokens.json".to_string(),
        };
        assert!(unavailable.is_reauthorization_required());

        let rejected = SchwabError::RefreshFailed {
            attempts: 3,
            reason: RefreshFailure::Rejected {
                status: 401,
                body: String::new(),
            },
        };
        assert!(rejected.is_reauthorization_required());
        assert_eq!(rejected.status_code(), Some(401));

        let transport = SchwabError::RefreshFailed {
            attempts: 3,
            reason: RefreshFailure::Transport("connection reset".to_string()),
        };
        assert!(!transport.is_reauthorization_required());
    }

    #[test]
    fn test_auth_error_names_operation() {
        let error = SchwabError::auth(
            "cancel order 42 in account HASH123",
            SchwabError::RefreshFailed {
                attempts: 2,
                reason: RefreshFailure::Rejected {
                    status: 400,
                    body: "invalid_grant".to_string(),
                },
            },
        );

        let message = error.to_string();
        assert!(message.starts_with("cancel order 42 in account HASH123: "));
        assert!(message.contains("invalid_grant"));
        assert!(error.is_reauthorization_required());
        assert_eq!(error.status_code(), Some(400));
        assert!(std::error::Error::source(&error).is_some());
    }
}
