//! Token lifecycle: lazy load, validity checks, and refresh.
//!
//! [`TokenManager`] is the only writer of the in-memory token. It loads the
//! persisted token on first use, answers from memory while the access token
//! is valid, and otherwise runs a single shared refresh against the token
//! endpoint that every concurrent caller awaits.

use crate::client::{create_rest_client, Config};
use crate::error::{RefreshFailure, Result, SchwabError};
use crate::store::TokenStore;
use crate::token::{Token, TokenState};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Bounded exponential backoff for token refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure
    pub initial_backoff: Duration,
    /// No retry is started that would end past this window
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_elapsed: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Create a retry policy
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_elapsed: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_elapsed,
        }
    }

    /// Delay before the retry that follows failed attempt number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Outcome of one shared refresh, handed to every waiter
#[derive(Debug, Clone)]
struct RefreshError {
    attempts: u32,
    failure: RefreshFailure,
}

impl From<RefreshError> for SchwabError {
    fn from(err: RefreshError) -> Self {
        match err.failure {
            RefreshFailure::Malformed(message) => SchwabError::MalformedToken(message),
            reason => SchwabError::RefreshFailed {
                attempts: err.attempts,
                reason,
            },
        }
    }
}

type RefreshResult = std::result::Result<Token, RefreshError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

struct State {
    token: Option<Token>,
    in_flight: Option<SharedRefresh>,
}

struct Inner {
    config: Config,
    http: Client,
    store: Arc<dyn TokenStore>,
    state: Mutex<State>,
}

/// Owns the current token and keeps it valid.
///
/// Cloning is cheap; clones share the same token and the same in-flight refresh.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

impl TokenManager {
    /// Create a manager with its own HTTP client
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::with_http_client(config, store, create_rest_client()?))
    }

    /// Create a manager using a caller-supplied HTTP client.
    ///
    /// The client is only cloned; its lifecycle stays with the caller.
    pub fn with_http_client(config: Config, store: Arc<dyn TokenStore>, http: Client) -> Self {
        TokenManager {
            inner: Arc::new(Inner {
                config,
                http,
                store,
                state: Mutex::new(State {
                    token: None,
                    in_flight: None,
                }),
            }),
        }
    }

    /// Configuration this manager was built with
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Store the manager loads from and saves to
    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.inner.store)
    }

    /// Make sure a usable access token is held, refreshing it if needed.
    ///
    /// Returns the valid token. With `force_refresh` the token endpoint is
    /// called even if the access token has not expired yet. Callers arriving
    /// while a refresh is running wait for it and share its outcome.
    ///
    /// The refresh runs as a spawned tokio task, so it completes and is
    /// persisted even if every caller stops waiting for it. Must be called
    /// from within a tokio runtime.
    pub async fn ensure_valid(&self, force_refresh: bool) -> Result<Token> {
        let refresh = {
            let mut state = self.inner.state.lock().await;

            if state.token.is_none() {
                state.token = self.inner.store.load().await;
                if state.token.is_some() {
                    tracing::debug!(
                        store = %self.inner.store.location(),
                        "loaded tokens from store"
                    );
                }
            }

            let Some(mut token) = state.token.clone() else {
                return Err(SchwabError::TokensUnavailable {
                    store: self.inner.store.location(),
                });
            };

            let now = Utc::now();
            if !force_refresh && token.is_access_token_valid_at(now) {
                return Ok(token);
            }

            // A refresh task that died without committing leaves a finished future behind
            if state.in_flight.as_ref().is_some_and(|f| f.peek().is_some()) {
                state.in_flight = None;
            }

            if let Some(in_flight) = &state.in_flight {
                tracing::debug!("joining in-flight token refresh");
                in_flight.clone()
            } else {
                if !token.is_refresh_token_valid_at(now) {
                    // A fresh authorization-code exchange may have saved a newer token
                    if let Some(stored) = self.inner.store.load().await {
                        if stored.created_at > token.created_at {
                            tracing::info!("picked up newer tokens from store");
                            state.token = Some(stored.clone());
                            token = stored;
                            if !force_refresh && token.is_access_token_valid_at(now) {
                                return Ok(token);
                            }
                        }
                    }

                    if !token.is_refresh_token_valid_at(now) {
                        tracing::warn!(
                            created_at = %token.created_at,
                            "refresh token expired; authorization-code flow required"
                        );
                        return Err(SchwabError::RefreshFailed {
                            attempts: 0,
                            reason: RefreshFailure::RefreshTokenExpired,
                        });
                    }
                }

                // The task owns the manager only until it finishes; the slot holds
                // just its join handle.
                let task = tokio::spawn(
                    Arc::clone(&self.inner).refresh(token.refresh_token.clone()),
                );
                let refresh = task
                    .map(|joined| {
                        joined.unwrap_or_else(|e| {
                            Err(RefreshError {
                                attempts: 0,
                                failure: RefreshFailure::Transport(format!(
                                    "refresh task failed: {}",
                                    e
                                )),
                            })
                        })
                    })
                    .boxed()
                    .shared();
                state.in_flight = Some(refresh.clone());
                refresh
            }
        };

        refresh.await.map_err(SchwabError::from)
    }

    /// Boolean form of [`ensure_valid`](Self::ensure_valid).
    ///
    /// Logs the failure reason and returns `false` instead of an error.
    /// Prefer `ensure_valid`, which cannot be ignored by accident.
    pub async fn try_ensure_valid(&self, force_refresh: bool) -> bool {
        match self.ensure_valid(force_refresh).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to obtain a valid access token");
                false
            }
        }
    }

    /// `Authorization` header value carrying a valid access token
    pub async fn auth_header(&self) -> Result<String> {
        Ok(self.ensure_valid(false).await?.authorization_header())
    }

    /// Lifecycle state of the in-memory token, without loading or refreshing
    pub async fn state(&self) -> TokenState {
        match &self.inner.state.lock().await.token {
            Some(token) => token.state_at(Utc::now()),
            None => TokenState::Uninitialized,
        }
    }

    /// Snapshot of the in-memory token
    pub async fn current_token(&self) -> Option<Token> {
        self.inner.state.lock().await.token.clone()
    }
}

impl Inner {
    /// The shared refresh: retries, persists and commits the new token
    async fn refresh(self: Arc<Self>, refresh_token: String) -> RefreshResult {
        let outcome = self.refresh_with_retry(&refresh_token).await;

        if let Ok(token) = &outcome {
            if let Err(e) = self.store.save(token).await {
                tracing::error!(
                    store = %self.store.location(),
                    error = %e,
                    "refreshed tokens could not be persisted"
                );
            }
        }

        let mut state = self.state.lock().await;
        state.in_flight = None;
        if let Ok(token) = &outcome {
            state.token = Some(token.clone());
        }

        outcome
    }

    async fn refresh_with_retry(&self, refresh_token: &str) -> RefreshResult {
        let policy = self.config.retry;
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let failure = match self.request_refresh(refresh_token).await {
                Ok(token) => {
                    tracing::info!(attempt, "refreshed access token");
                    return Ok(token);
                }
                Err(failure @ RefreshFailure::Malformed(_)) => {
                    tracing::warn!(error = %failure, "token endpoint returned a malformed token");
                    return Err(RefreshError {
                        attempts: attempt,
                        failure,
                    });
                }
                Err(failure) => failure,
            };

            let delay = policy.backoff(attempt);
            if attempt >= policy.max_attempts || started.elapsed() + delay > policy.max_elapsed {
                tracing::warn!(attempt, error = %failure, "token refresh failed, giving up");
                return Err(RefreshError {
                    attempts: attempt,
                    failure,
                });
            }

            tracing::warn!(attempt, ?delay, error = %failure, "token refresh failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    async fn request_refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<Token, RefreshFailure> {
        let response = self
            .http
            .post(self.config.token_url())
            .header(AUTHORIZATION, self.config.basic_auth_header())
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .timeout(self.config.retry.max_elapsed)
            .send()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        if status != StatusCode::OK {
            return Err(RefreshFailure::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Token::from_json(&body).map_err(|e| match e {
            SchwabError::MalformedToken(message) => RefreshFailure::Malformed(message),
            other => RefreshFailure::Malformed(other.to_string()),
        })
    }
}
