use crate::client::{create_rest_client, Config};
use crate::error::{Result, SchwabError};
use crate::manager::TokenManager;
use crate::models::{
    to_compact_json, Account, AccountInstrument, AccountNumberWithHashId, InstrumentProjection,
    InstrumentsResponse, MarketHourInfo, MarketType, OptionChain, OptionChainQueryFilter,
    OptionContractType, OptionExpiration, OptionExpirationChainResponse, Order, OrderStatus,
    SecuritiesAccount,
};
use crate::response::{ensure_success, order_id_from_location, parse_json};
use crate::store::{LocalTokenStore, TokenStore};
use crate::time::{date_to_str, to_iso8601};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use std::sync::Arc;

/// Client for the trader and market data APIs.
///
/// Every request carries a bearer token obtained from the shared
/// [`TokenManager`], which refreshes it when needed.
#[derive(Clone)]
pub struct SchwabClient {
    http: Client,
    tokens: TokenManager,
}

impl SchwabClient {
    /// Create a client persisting tokens to `config.token_file`
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(LocalTokenStore::new(config.token_file.clone()));
        Self::with_token_store(config, store)
    }

    /// Create a client with a custom token store
    pub fn with_token_store(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::with_http_client(config, store, create_rest_client()?))
    }

    /// Create a client sharing a caller-supplied HTTP client.
    ///
    /// The same client is used for the token endpoint.
    pub fn with_http_client(config: Config, store: Arc<dyn TokenStore>, http: Client) -> Self {
        let tokens = TokenManager::with_http_client(config, store, http.clone());
        SchwabClient { http, tokens }
    }

    /// Token manager backing this client
    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &Config {
        self.tokens.config()
    }

    /// Start an authenticated request; token failures are tagged with `operation`
    async fn request(&self, method: Method, url: &str, operation: &str) -> Result<RequestBuilder> {
        let auth = self
            .tokens
            .auth_header()
            .await
            .map_err(|e| SchwabError::auth(operation, e))?;
        tracing::debug!(%method, url, operation, "API request");
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json"))
    }

    /// List account numbers with the hashes used to address them
    pub async fn get_account_numbers(&self) -> Result<Vec<AccountNumberWithHashId>> {
        let operation = "get account numbers";
        let url = format!("{}/accounts/accountNumbers", self.config().trader_url());
        let response = self.request(Method::GET, &url, operation).await?.send().await?;
        parse_json(response, operation).await
    }

    /// Get all linked accounts, or only `account` when given
    pub async fn get_accounts(
        &self,
        include_positions: bool,
        account: Option<&AccountNumberWithHashId>,
    ) -> Result<Vec<Account>> {
        let mut url = format!("{}/accounts", self.config().trader_url());
        let operation = match account {
            Some(account) => {
                url = format!("{}/{}", url, account.hash_value);
                format!("get account {}", account.hash_value)
            }
            None => "get accounts".to_string(),
        };

        let mut request = self.request(Method::GET, &url, &operation).await?;
        if include_positions {
            request = request.query(&[("fields", "positions")]);
        }
        let response = request.send().await?;

        match account {
            Some(_) => {
                let single: SecuritiesAccount = parse_json(response, &operation).await?;
                Ok(vec![single.securities_account])
            }
            None => {
                let all: Vec<SecuritiesAccount> = parse_json(response, &operation).await?;
                Ok(all.into_iter().map(|a| a.securities_account).collect())
            }
        }
    }

    /// Get one account
    pub async fn get_single_account(
        &self,
        account: &AccountNumberWithHashId,
        include_positions: bool,
    ) -> Result<Option<Account>> {
        let accounts = self.get_accounts(include_positions, Some(account)).await?;
        Ok(accounts.into_iter().next())
    }

    /// Search instruments
    pub async fn get_instruments(
        &self,
        symbol: &str,
        projection: InstrumentProjection,
    ) -> Result<Vec<AccountInstrument>> {
        let operation = format!("get instruments for {}", symbol);
        let url = format!("{}/instruments", self.config().market_data_url());
        let response = self
            .request(Method::GET, &url, &operation)
            .await?
            .query(&[("symbol", symbol), ("projection", projection.as_str())])
            .send()
            .await?;
        let found: InstrumentsResponse = parse_json(response, &operation).await?;
        Ok(found.instruments)
    }

    /// Cancel an open order
    pub async fn cancel_order(&self, account_hash: &str, order_id: i64) -> Result<()> {
        let operation = format!("cancel order {} in account {}", order_id, account_hash);
        let url = self.order_url(account_hash, order_id);
        let response = self.request(Method::DELETE, &url, &operation).await?.send().await?;
        ensure_success(response, &operation).await?;
        tracing::info!(order_id, "order canceled");
        Ok(())
    }

    /// Submit an order and return the id the broker assigned to it
    pub async fn place_order(&self, account_hash: &str, order: &Order) -> Result<i64> {
        let operation = format!("place order in account {}", account_hash);
        let url = format!("{}/accounts/{}/orders", self.config().trader_url(), account_hash);
        let body = to_compact_json(order)?;

        let response = self
            .request(Method::POST, &url, &operation)
            .await?
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(SchwabError::api(operation, status.as_u16(), body));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                SchwabError::Other(format!("{}: response has no Location header", operation))
            })?;
        let order_id = order_id_from_location(location).ok_or_else(|| {
            SchwabError::Other(format!("{}: no order id in Location {}", operation, location))
        })?;

        tracing::info!(order_id, "order placed");
        Ok(order_id)
    }

    /// Get one order; `None` when the broker does not know it
    pub async fn get_order_by_id(
        &self,
        account_hash: &str,
        order_id: i64,
    ) -> Result<Option<Order>> {
        let operation = format!("get order {} in account {}", order_id, account_hash);
        let url = self.order_url(account_hash, order_id);
        let response = self.request(Method::GET, &url, &operation).await?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(order_id, "order not found");
            return Ok(None);
        }

        parse_json(response, &operation).await.map(Some)
    }

    /// List orders entered between `from` and `to`
    pub async fn get_orders(
        &self,
        account_hash: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_count: u32,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let operation = format!("get orders in account {}", account_hash);
        let url = format!("{}/accounts/{}/orders", self.config().trader_url(), account_hash);
        let mut query = vec![
            ("fromEnteredTime", to_iso8601(&from)),
            ("toEnteredTime", to_iso8601(&to)),
            ("maxResults", max_count.to_string()),
        ];
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }

        let response = self
            .request(Method::GET, &url, &operation)
            .await?
            .query(&query)
            .send()
            .await?;
        parse_json(response, &operation).await
    }

    /// Option expirations listed for an underlying
    pub async fn get_option_expirations(&self, symbol: &str) -> Result<Vec<OptionExpiration>> {
        let operation = format!("get option expirations for {}", symbol);
        let url = format!("{}/expirationchain", self.config().market_data_url());
        let response = self
            .request(Method::GET, &url, &operation)
            .await?
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        let chain: OptionExpirationChainResponse = parse_json(response, &operation).await?;
        Ok(chain.expiration_list)
    }

    /// Trading hours of all markets, or of one, for today or `date`
    pub async fn get_market_hour_info(
        &self,
        market: Option<MarketType>,
        date: Option<NaiveDate>,
    ) -> Result<MarketHourInfo> {
        let mut url = format!("{}/markets", self.config().market_data_url());
        if let Some(market) = market {
            url = format!("{}/{}", url, market.as_path());
        }

        let operation = "get market hours";
        let mut request = self.request(Method::GET, &url, operation).await?;
        if let Some(date) = date {
            request = request.query(&[("date", date_to_str(&date))]);
        }
        parse_json(request.send().await?, operation).await
    }

    /// Option chain of `symbol` for expirations between the two dates
    pub async fn download_option_chain(
        &self,
        symbol: &str,
        from_date: NaiveDate,
        to_date: NaiveDate,
        contract_type: OptionContractType,
    ) -> Result<OptionChain> {
        let filter =
            OptionChainQueryFilter::new(symbol, date_to_str(&from_date), date_to_str(&to_date))
                .with_contract_type(contract_type);
        self.download_option_chain_filtered(&filter).await
    }

    /// Option chain for a custom filter
    pub async fn download_option_chain_filtered(
        &self,
        filter: &OptionChainQueryFilter,
    ) -> Result<OptionChain> {
        let operation = format!("download option chain for {}", filter.symbol);
        let url = format!("{}/chains", self.config().market_data_url());
        let response = self
            .request(Method::GET, &url, &operation)
            .await?
            .query(filter)
            .send()
            .await?;
        parse_json(response, &operation).await
    }

    fn order_url(&self, account_hash: &str, order_id: i64) -> String {
        format!(
            "{}/accounts/{}/orders/{}",
            self.config().trader_url(),
            account_hash,
            order_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;

    #[test]
    fn test_order_url() {
        let client = SchwabClient::with_http_client(
            Config::new("fake_id", "fake_secret"),
            Arc::new(MemoryTokenStore::new()),
            Client::new(),
        );
        assert_eq!(
            client.order_url("HASH", 42),
            "https://api.schwabapi.com/trader/v1/accounts/HASH/orders/42"
        );
    }

    #[tokio::test]
    async fn test_requests_need_tokens() {
        let client = SchwabClient::with_http_client(
            Config::new("fake_id", "fake_secret").with_base_url("http://127.0.0.1:1"),
            Arc::new(MemoryTokenStore::new()),
            Client::new(),
        );

        let err = client.get_account_numbers().await.unwrap_err();
        assert!(err.is_reauthorization_required());
        assert!(matches!(err, SchwabError::Auth { .. }));
        assert!(err.to_string().starts_with("get account numbers: "));
    }
}
