//! Building blocks for the interactive authorization-code login.
//!
//! Prompting the user and opening a browser are left to the caller. These
//! helpers build the login URL, pull the code out of the URL the browser was
//! redirected to, and exchange it for the first [`Token`], which is saved to
//! the same store the [`TokenManager`](crate::TokenManager) reads.

use crate::client::{create_rest_client, Config};
use crate::error::{Result, SchwabError};
use crate::store::TokenStore;
use crate::token::Token;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use url::Url;

/// Exchanges one-time authorization codes for tokens
pub struct AuthorizationCodeExchange {
    config: Config,
    http: Client,
    store: Arc<dyn TokenStore>,
}

impl AuthorizationCodeExchange {
    /// Create an exchange with its own HTTP client
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::with_http_client(config, store, create_rest_client()?))
    }

    /// Create an exchange using a caller-supplied HTTP client
    pub fn with_http_client(config: Config, store: Arc<dyn TokenStore>, http: Client) -> Self {
        AuthorizationCodeExchange { config, http, store }
    }

    /// Login page the user must open in a browser
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.auth_url())?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri);
        Ok(url)
    }

    /// Exchange a code for a token and persist it.
    ///
    /// `code` is the decoded value of the `code` query parameter, see
    /// [`extract_code`].
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Token> {
        let response = self
            .http
            .post(self.config.token_url())
            .header(AUTHORIZATION, self.config.basic_auth_header())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if status != StatusCode::OK {
            return Err(SchwabError::api(
                "authorization code exchange",
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        let token = Token::from_json(&body)?;
        self.store.save(&token).await?;
        tracing::info!(store = %self.store.location(), "saved tokens from authorization code");
        Ok(token)
    }
}

/// Pull the authorization code out of the URL the browser landed on after login
pub fn extract_code(redirected_url: &str) -> Result<String> {
    let url = Url::parse(redirected_url.trim())?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| SchwabError::Other(format!("no authorization code in {}", redirected_url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;

    #[test]
    fn test_authorization_url() {
        let exchange = AuthorizationCodeExchange::with_http_client(
            Config::new("fake_id", "fake_secret"),
            Arc::new(MemoryTokenStore::new()),
            Client::new(),
        );

        let url = exchange.authorization_url("https://127.0.0.1").unwrap();
        assert_eq!(
            url.as_str(),
            concat!(
                "https://api.schwabapi.com/v1/oauth/authorize",
                "?client_id=fake_id&redirect_uri=https%3A%2F%2F127.0.0.1"
            )
        );
    }

    #[test]
    fn test_extract_code_decodes() {
        let code = extract_code("https://127.0.0.1/?code=C0.b2F1dGgy%40&session=abc").unwrap();
        assert_eq!(code, "C0.b2F1dGgy@");
    }

    #[test]
    fn test_extract_code_missing() {
        assert!(extract_code("https://127.0.0.1/?session=abc").is_err());
        assert!(extract_code("not a url").is_err());
    }
}
