use crate::error::{Result, SchwabError};
use crate::manager::RetryPolicy;
use crate::store::DEFAULT_TOKEN_FILE;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, ClientBuilder};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Production API host
pub const SCHWAB_API_BASE_URL: &str = "https://api.schwabapi.com";
/// OAuth2 token endpoint, relative to the base URL
pub const SCHWAB_TOKEN_PATH: &str = "v1/oauth/token";
/// OAuth2 authorization endpoint, relative to the base URL
pub const SCHWAB_AUTH_PATH: &str = "v1/oauth/authorize";
/// Trader API prefix, relative to the base URL
pub const SCHWAB_TRADER_PATH: &str = "trader/v1";
/// Market data API prefix, relative to the base URL
pub const SCHWAB_MARKET_DATA_PATH: &str = "marketdata/v1";

/// Create the default HTTP client for API requests
/// with settings for connection pooling and timeouts
pub fn create_rest_client() -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Configuration for the API client and its token manager
#[derive(Clone)]
pub struct Config {
    /// Application client id (the app key)
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
    /// Scheme and host of the API, without trailing slash
    pub base_url: String,
    /// Token endpoint path
    pub token_path: String,
    /// Authorization endpoint path
    pub auth_path: String,
    /// Token file used when no store is injected
    pub token_file: PathBuf,
    /// Retry policy for token refresh
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client_id: String::new(),
            client_secret: String::new(),
            base_url: SCHWAB_API_BASE_URL.to_string(),
            token_path: SCHWAB_TOKEN_PATH.to_string(),
            auth_path: SCHWAB_AUTH_PATH.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with the given application credentials
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Config::default().with_credentials(client_id, client_secret)
    }

    /// Build a configuration from the environment.
    ///
    /// `SCHWAB_CLIENT_ID` and `SCHWAB_CLIENT_SECRET` are required;
    /// `SCHWAB_TOKEN_FILE` and `SCHWAB_API_BASE_URL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("SCHWAB_CLIENT_ID")
            .map_err(|_| SchwabError::MissingConfig("SCHWAB_CLIENT_ID"))?;
        let client_secret = env::var("SCHWAB_CLIENT_SECRET")
            .map_err(|_| SchwabError::MissingConfig("SCHWAB_CLIENT_SECRET"))?;

        let mut config = Config::new(client_id, client_secret);
        if let Ok(path) = env::var("SCHWAB_TOKEN_FILE") {
            config = config.with_token_file(path);
        }
        if let Ok(url) = env::var("SCHWAB_API_BASE_URL") {
            config = config.with_base_url(url);
        }
        Ok(config)
    }

    /// Set the application credentials
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    /// Override the API host (for testing with wiremock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the token file path
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    /// Set the token refresh retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the token endpoint
    pub fn token_url(&self) -> String {
        format!("{}/{}", self.base_url, self.token_path)
    }

    /// Full URL of the authorization endpoint
    pub fn auth_url(&self) -> String {
        format!("{}/{}", self.base_url, self.auth_path)
    }

    /// Trader API root
    pub fn trader_url(&self) -> String {
        format!("{}/{}", self.base_url, SCHWAB_TRADER_PATH)
    }

    /// Market data API root
    pub fn market_data_url(&self) -> String {
        format!("{}/{}", self.base_url, SCHWAB_MARKET_DATA_PATH)
    }

    /// `Authorization` header value for the token endpoint:
    /// `Basic base64(client_id:client_secret)`
    pub fn basic_auth_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        format!("Basic {}", encoded)
    }
}

// Implement Debug manually to avoid exposing the client secret
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_path", &self.token_path)
            .field("auth_path", &self.auth_path)
            .field("token_file", &self.token_file)
            .field("retry", &self.retry)
            .finish()
    }
}
