//! # schwab-client - Charles Schwab Trader API client for Rust
//!
//! An async client for the Schwab trader and market data REST APIs. The
//! center of the crate is OAuth2 token lifecycle management: tokens are
//! loaded lazily from a pluggable store, refreshed with bounded retries when
//! the access token expires, and a single refresh is shared by every caller
//! that needs one at the same time.
//!
//! ## Features
//!
//! - Token persistence through the [`TokenStore`] trait:
//!   - [`LocalTokenStore`] writes a JSON file atomically
//!   - [`MemoryTokenStore`] for tests and embedding
//! - [`TokenManager`] with single-flight refresh and exponential backoff
//! - Authorization-code exchange for the first login
//! - Typed account, order, option chain and market hours models
//!
//! ## Basic Usage
//!
//! ```no_run
//! use schwab_client::{Config, SchwabClient};
//!
//! # async fn run() -> schwab_client::Result<()> {
//! let client = SchwabClient::new(Config::from_env()?)?;
//!
//! for account in client.get_account_numbers().await? {
//!     let orders = client
//!         .get_orders(
//!             &account.hash_value,
//!             chrono::Utc::now() - chrono::Duration::days(1),
//!             chrono::Utc::now(),
//!             100,
//!             None,
//!         )
//!         .await?;
//!     println!("{}: {} orders", account.account_number, orders.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## First Login
//!
//! Refresh tokens expire after seven days, after which a new authorization
//! code is needed:
//!
//! ```no_run
//! use schwab_client::{extract_code, AuthorizationCodeExchange, Config, LocalTokenStore};
//! use std::sync::Arc;
//!
//! # async fn run(redirected: &str) -> schwab_client::Result<()> {
//! let config = Config::from_env()?;
//! let store = Arc::new(LocalTokenStore::new(config.token_file.clone()));
//! let exchange = AuthorizationCodeExchange::new(config, store)?;
//!
//! println!("open {}", exchange.authorization_url("https://127.0.0.1")?);
//! let code = extract_code(redirected)?;
//! exchange.exchange_code(&code, "https://127.0.0.1").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod manager;
pub mod models;
pub mod response;
pub mod rest;
pub mod store;
pub mod time;
pub mod token;

// Re-export main types for convenience
pub use auth::{extract_code, AuthorizationCodeExchange};
pub use client::Config;
pub use error::{RefreshFailure, Result, SchwabError};
pub use manager::{RetryPolicy, TokenManager};
pub use rest::SchwabClient;
pub use store::{LocalTokenStore, MemoryTokenStore, TokenStore};
pub use time::Time;
pub use token::{Token, TokenState};

// Re-export serde_json for convenience
pub use serde_json::json;
