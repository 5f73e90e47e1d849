use crate::time::Time;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Option expiration cycle: month end, quarter, standard (third Friday), weekly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpirationType {
    M,
    Q,
    S,
    W,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionExpiration {
    pub expiration_date: String,
    #[serde(default)]
    pub days_to_expiration: Option<i64>,
    #[serde(default)]
    pub expiration_type: Option<ExpirationType>,
    #[serde(default)]
    pub standard: Option<bool>,
}

/// Body of `GET /marketdata/v1/expirationchain`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionExpirationChainResponse {
    #[serde(default)]
    pub expiration_list: Vec<OptionExpiration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionContractType {
    Call,
    Put,
    #[default]
    All,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionContractStrategy {
    Single,
    #[default]
    Analytical,
    Covered,
    Vertical,
    Calendar,
    Strangle,
    Straddle,
    Butterfly,
    Condor,
    Diagonal,
    Collar,
    Roll,
}

/// Moneyness filter for option chain queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionContractRange {
    Itm,
    Ntm,
    Otm,
    Sak,
    Sbk,
    Snk,
    All,
}

/// Query string of `GET /marketdata/v1/chains`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainQueryFilter {
    pub symbol: String,
    pub contract_type: OptionContractType,
    /// Strikes returned above and below the at-the-money price
    pub strike_count: u32,
    pub include_underlying_quote: bool,
    pub strategy: OptionContractStrategy,
    /// Strike interval for spread strategies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    /// Strike price for spread strategies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<OptionContractRange>,
    pub from_date: String,
    pub to_date: String,
}

impl OptionChainQueryFilter {
    /// Filter for all contracts of `symbol` expiring between the two dates (`YYYY-MM-DD`)
    pub fn new(
        symbol: impl Into<String>,
        from_date: impl Into<String>,
        to_date: impl Into<String>,
    ) -> Self {
        OptionChainQueryFilter {
            symbol: symbol.into(),
            contract_type: OptionContractType::All,
            strike_count: 40,
            include_underlying_quote: true,
            strategy: OptionContractStrategy::Analytical,
            interval: None,
            strike: None,
            range: None,
            from_date: from_date.into(),
            to_date: to_date.into(),
        }
    }

    pub fn with_contract_type(mut self, contract_type: OptionContractType) -> Self {
        self.contract_type = contract_type;
        self
    }

    pub fn with_strike_count(mut self, strike_count: u32) -> Self {
        self.strike_count = strike_count;
        self
    }

    pub fn with_range(mut self, range: OptionContractRange) -> Self {
        self.range = Some(range);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub put_call: OptionContractType,
    pub symbol: String,
    pub description: String,
    pub exchange_name: String,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub last: Option<f64>,
    pub mark: Option<f64>,
    pub bid_size: Option<i64>,
    pub ask_size: Option<i64>,
    pub last_size: Option<i64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub open_price: Option<f64>,
    pub close_price: Option<f64>,
    pub total_volume: Option<i64>,
    pub trade_date: Option<i64>,
    pub quote_time_in_long: Option<Time>,
    pub trade_time_in_long: Option<Time>,
    pub net_change: Option<f64>,
    pub volatility: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
    pub rho: Option<f64>,
    pub open_interest: Option<i64>,
    pub time_value: Option<f64>,
    pub theoretical_option_value: Option<f64>,
    pub theoretical_volatility: Option<f64>,
    pub strike_price: f64,
    pub expiration_date: String,
    pub days_to_expiration: i64,
    /// M end of month, W weekly, Q quarterly, S third Friday
    pub expiration_type: String,
    pub last_trading_day: Option<i64>,
    pub multiplier: Option<f64>,
    /// AM or PM settlement
    pub settlement_type: String,
    pub is_index: Option<bool>,
    pub percent_change: Option<f64>,
    pub mark_change: Option<f64>,
    pub mark_percent_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Underlying {
    pub ask: f64,
    pub ask_size: i64,
    pub bid: f64,
    pub bid_size: i64,
    pub close: f64,
    pub description: Option<String>,
    pub exchange_name: String,
    pub high_price: Option<f64>,
    pub last: Option<f64>,
    pub low_price: Option<f64>,
    pub mark: Option<f64>,
    pub mark_change: Option<f64>,
    pub mark_percent_change: Option<f64>,
    pub open_price: Option<f64>,
    pub percent_change: f64,
    pub quote_time: Time,
    pub symbol: String,
    pub total_volume: Option<i64>,
    pub trade_time: Option<Time>,
}

/// Contracts keyed by `"{expiration}:{days}"`, then by strike
pub type ExpDateMap = BTreeMap<String, BTreeMap<String, Vec<OptionContract>>>;

/// Body of `GET /marketdata/v1/chains`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChain {
    pub symbol: String,
    pub status: String,
    pub underlying: Option<Underlying>,
    pub strategy: String,
    pub interval: Option<f64>,
    pub is_delayed: bool,
    pub is_index: bool,
    pub interest_rate: f64,
    pub underlying_price: f64,
    pub volatility: f64,
    pub days_to_expiration: f64,
    pub number_of_contracts: i64,
    #[serde(default)]
    pub put_exp_date_map: ExpDateMap,
    #[serde(default)]
    pub call_exp_date_map: ExpDateMap,
}

/// One contract flattened for tabular use
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChainRow {
    pub underlying_price: Option<f64>,
    pub strike: f64,
    pub symbol: String,
    pub last_price: Option<f64>,
    pub open_interest: Option<i64>,
    pub ask: Option<f64>,
    pub bid: Option<f64>,
    pub expiration_date: String,
    pub quote_date: Option<String>,
    pub volume: Option<i64>,
    pub gamma: Option<f64>,
    pub delta: Option<f64>,
    pub vega: Option<f64>,
    pub volatility: Option<f64>,
}

/// Calls and puts of one expiration, ordered by strike
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChainExpiration {
    pub expiration: String,
    pub underlying_symbol: String,
    pub calls: Vec<OptionChainRow>,
    pub puts: Vec<OptionChainRow>,
}

impl OptionChain {
    /// Flatten the chain into per-expiration call/put rows.
    ///
    /// `strip_space` removes the padding inside OCC symbols
    /// (`SPXW  240701C05530000` becomes `SPXW240701C05530000`).
    pub fn rows_by_expiration(&self, strip_space: bool) -> Vec<OptionChainExpiration> {
        let mut by_expiration: BTreeMap<String, OptionChainExpiration> = BTreeMap::new();

        for (map, is_call) in [(&self.call_exp_date_map, true), (&self.put_exp_date_map, false)] {
            for (exp_key, strikes) in map {
                let expiration = exp_key.split(':').next().unwrap_or(exp_key).to_string();
                let entry = by_expiration
                    .entry(expiration.clone())
                    .or_insert_with(|| OptionChainExpiration {
                        expiration,
                        underlying_symbol: self.symbol.clone(),
                        calls: Vec::new(),
                        puts: Vec::new(),
                    });

                let rows = strikes
                    .values()
                    .flatten()
                    .map(|contract| self.row(contract, strip_space));
                if is_call {
                    entry.calls.extend(rows);
                } else {
                    entry.puts.extend(rows);
                }
            }
        }

        let mut result: Vec<OptionChainExpiration> = by_expiration.into_values().collect();
        for expiration in &mut result {
            expiration.calls.sort_by(|a, b| a.strike.total_cmp(&b.strike));
            expiration.puts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        }
        result
    }

    fn row(&self, contract: &OptionContract, strip_space: bool) -> OptionChainRow {
        let symbol = if strip_space {
            contract.symbol.split_whitespace().collect()
        } else {
            contract.symbol.clone()
        };

        OptionChainRow {
            underlying_price: self.underlying.as_ref().and_then(|u| u.mark),
            strike: contract.strike_price,
            symbol,
            last_price: contract.last,
            open_interest: contract.open_interest,
            ask: contract.ask,
            bid: contract.bid,
            expiration_date: contract.expiration_date.clone(),
            quote_date: contract.quote_time_in_long.map(|t| t.date_string()),
            volume: contract.total_volume,
            gamma: contract.gamma,
            delta: contract.delta,
            vega: contract.vega,
            volatility: contract.volatility,
        }
    }
}

/// Market selector for `GET /marketdata/v1/markets/{market}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketType {
    Equity,
    Option,
    Bond,
    Future,
    Forex,
}

impl MarketType {
    /// Path segment for this market
    pub fn as_path(&self) -> &'static str {
        match self {
            MarketType::Equity => "equity",
            MarketType::Option => "option",
            MarketType::Bond => "bond",
            MarketType::Future => "future",
            MarketType::Forex => "forex",
        }
    }
}

/// One trading window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHours {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl MarketHours {
    /// Whether `at` falls inside this window
    pub fn contains<Tz: chrono::TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        let at = at.fixed_offset();
        self.start <= at && at < self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHours {
    #[serde(default)]
    pub pre_market: Vec<MarketHours>,
    #[serde(default)]
    pub regular_market: Vec<MarketHours>,
    #[serde(default)]
    pub post_market: Vec<MarketHours>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketHourDetail {
    pub date: String,
    pub market_type: String,
    pub exchange: Option<String>,
    pub category: Option<String>,
    pub product: String,
    pub product_name: Option<String>,
    pub is_open: bool,
    pub session_hours: Option<SessionHours>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityMarket {
    #[serde(rename = "EQ")]
    pub eq: Option<MarketHourDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionMarket {
    /// Equity options
    #[serde(rename = "EQO")]
    pub eqo: Option<MarketHourDetail>,
    /// Index options
    #[serde(rename = "IND")]
    pub ind: Option<MarketHourDetail>,
}

/// Body of `GET /marketdata/v1/markets`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHourInfo {
    pub equity: Option<EquityMarket>,
    pub option: Option<OptionMarket>,
    pub bond: Option<HashMap<String, MarketHourDetail>>,
    pub future: Option<HashMap<String, MarketHourDetail>>,
    pub forex: Option<HashMap<String, MarketHourDetail>>,
}

impl MarketHourInfo {
    pub fn is_equity_market_open(&self) -> bool {
        self.equity
            .as_ref()
            .and_then(|m| m.eq.as_ref())
            .map(|d| d.is_open)
            .unwrap_or(false)
    }

    pub fn is_option_market_open(&self) -> bool {
        self.option
            .as_ref()
            .and_then(|m| m.eqo.as_ref().or(m.ind.as_ref()))
            .map(|d| d.is_open)
            .unwrap_or(false)
    }
}
