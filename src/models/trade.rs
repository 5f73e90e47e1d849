use super::market::OptionContractType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Margin,
    Cash,
    Ira,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    AwaitingParentOrder,
    AwaitingCondition,
    AwaitingStopCondition,
    AwaitingManualReview,
    Accepted,
    AwaitingUrOut,
    PendingActivation,
    Queued,
    Working,
    Rejected,
    PendingCancel,
    Canceled,
    PendingReplace,
    Replaced,
    Filled,
    Expired,
    New,
    AwaitingReleaseTime,
    PendingAcknowledgement,
    PendingRecall,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Wire name, as used in the `status` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingParentOrder => "AWAITING_PARENT_ORDER",
            OrderStatus::AwaitingCondition => "AWAITING_CONDITION",
            OrderStatus::AwaitingStopCondition => "AWAITING_STOP_CONDITION",
            OrderStatus::AwaitingManualReview => "AWAITING_MANUAL_REVIEW",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::AwaitingUrOut => "AWAITING_UR_OUT",
            OrderStatus::PendingActivation => "PENDING_ACTIVATION",
            OrderStatus::Queued => "QUEUED",
            OrderStatus::Working => "WORKING",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::PendingCancel => "PENDING_CANCEL",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::PendingReplace => "PENDING_REPLACE",
            OrderStatus::Replaced => "REPLACED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Expired => "EXPIRED",
            OrderStatus::New => "NEW",
            OrderStatus::AwaitingReleaseTime => "AWAITING_RELEASE_TIME",
            OrderStatus::PendingAcknowledgement => "PENDING_ACKNOWLEDGEMENT",
            OrderStatus::PendingRecall => "PENDING_RECALL",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    #[default]
    Limit,
    Stop,
    StopLimit,
    TrailingStop,
    Cabinet,
    NonMarketable,
    MarketOnClose,
    Exercise,
    TrailingStopLimit,
    NetDebit,
    NetCredit,
    NetZero,
    LimitOnClose,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexOrderStrategyType {
    None,
    Covered,
    Vertical,
    BackRatio,
    Calendar,
    Diagonal,
    Straddle,
    Strangle,
    CollarSynthetic,
    Butterfly,
    Condor,
    IronCondor,
    VerticalRoll,
    CollarWithStock,
    DoubleDiagonal,
    UnbalancedButterfly,
    UnbalancedCondor,
    UnbalancedIronCondor,
    UnbalancedVerticalRoll,
    MutualFundSwap,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Session {
    #[default]
    Normal,
    Am,
    Pm,
    Seamless,
}

/// Time in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDuration {
    #[default]
    Day,
    GoodTillCancel,
    FillOrKill,
    ImmediateOrCancel,
    EndOfWeek,
    EndOfMonth,
    NextEndOfMonth,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    Inet,
    EcnArca,
    Cboe,
    Amex,
    Phlx,
    Ise,
    Box,
    Nyse,
    Nasdaq,
    Bats,
    C2,
    Auto,
}

/// Instrument class; also used as the order leg type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Equity,
    Etf,
    Option,
    Index,
    MutualFund,
    CashEquivalent,
    FixedIncome,
    Currency,
    CollectiveInvestment,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    Vanilla,
    Binary,
    Barrier,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderLegInstruction {
    Buy,
    Sell,
    BuyToCover,
    SellShort,
    BuyToOpen,
    BuyToClose,
    SellToOpen,
    SellToClose,
    Exchange,
    SellShortExempt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionEffect {
    Opening,
    Closing,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialInstruction {
    AllOrNone,
    DoNotReduce,
    AllOrNoneDoNotReduce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStrategyType {
    #[default]
    Single,
    Cancel,
    Recall,
    Pair,
    Flatten,
    TwoDaySwap,
    BlastAll,
    Oco,
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxLotMethod {
    Fifo,
    Lifo,
    HighCost,
    LowCost,
    AverageCost,
    SpecificLot,
    LossHarvester,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceLinkType {
    Value,
    Percent,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopType {
    Standard,
    Bid,
    Ask,
    Last,
    Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceLinkBasis {
    Manual,
    Base,
    Trigger,
    Last,
    Bid,
    Ask,
    AskBid,
    Mark,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderActivityType {
    Execution,
    OrderAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    Fill,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuantityType {
    AllShares,
    Dollars,
    Shares,
}

/// Search mode of `GET /marketdata/v1/instruments`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentProjection {
    SymbolSearch,
    SymbolRegex,
    DescSearch,
    DescRegex,
    Search,
    #[default]
    Fundamental,
}

impl InstrumentProjection {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentProjection::SymbolSearch => "symbol-search",
            InstrumentProjection::SymbolRegex => "symbol-regex",
            InstrumentProjection::DescSearch => "desc-search",
            InstrumentProjection::DescRegex => "desc-regex",
            InstrumentProjection::Search => "search",
            InstrumentProjection::Fundamental => "fundamental",
        }
    }
}

/// Plain account number and the opaque hash that addresses it in URLs.
///
/// Every per-account endpoint takes the hash, never the number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumberWithHashId {
    pub account_number: String,
    pub hash_value: String,
}

/// Balance snapshot; initial balances carry the extra cash fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Balance {
    pub available_funds: Option<f64>,
    pub available_funds_non_marginable_trade: Option<f64>,
    pub buying_power: Option<f64>,
    pub buying_power_non_marginable_trade: Option<f64>,
    pub day_trading_buying_power: Option<f64>,
    pub day_trading_buying_power_call: Option<f64>,
    pub day_trading_equity_call: Option<f64>,
    pub equity: Option<f64>,
    pub equity_percentage: Option<f64>,
    pub long_margin_value: Option<f64>,
    pub long_option_market_value: Option<f64>,
    pub long_stock_value: Option<f64>,
    pub maintenance_call: Option<f64>,
    pub maintenance_requirement: Option<f64>,
    pub margin: Option<f64>,
    pub margin_equity: Option<f64>,
    pub money_market_fund: Option<f64>,
    pub mutual_fund_value: Option<f64>,
    pub sma: Option<f64>,
    pub stock_buying_power: Option<f64>,
    pub option_buying_power: Option<f64>,
    pub reg_t_call: Option<f64>,
    pub short_margin_value: Option<f64>,
    pub short_option_market_value: Option<f64>,
    pub short_stock_value: Option<f64>,
    pub total_cash: Option<f64>,
    pub is_in_call: Option<bool>,
    pub unsettled_cash: Option<f64>,
    pub pending_deposits: Option<f64>,
    pub margin_balance: Option<f64>,
    pub short_balance: Option<f64>,
    pub account_value: Option<f64>,
    pub accrued_interest: Option<f64>,
    pub bond_value: Option<f64>,
    pub cash_balance: Option<f64>,
    pub cash_available_for_trading: Option<f64>,
    pub cash_receipts: Option<f64>,
    pub liquidation_value: Option<f64>,
}

/// Instrument as it appears in positions, order legs and instrument search.
///
/// Equity, fixed income and option instruments share one record; fields
/// that do not apply to an asset type are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountInstrument {
    pub asset_type: Option<AssetType>,
    pub cusip: Option<String>,
    pub description: Option<String>,
    pub instrument_id: Option<i64>,
    pub symbol: Option<String>,
    pub net_change: Option<f64>,
    pub maturity_date: Option<String>,
    pub factor: Option<f64>,
    pub variable_rate: Option<f64>,
    pub option_deliverables: Option<serde_json::Value>,
    pub put_call: Option<OptionContractType>,
    pub option_multiplier: Option<f64>,
    #[serde(rename = "type")]
    pub option_type: Option<OptionType>,
    pub underlying_symbol: Option<String>,
}

impl AccountInstrument {
    /// Instrument reference for an order leg
    pub fn new(asset_type: AssetType, symbol: impl Into<String>) -> Self {
        AccountInstrument {
            asset_type: Some(asset_type),
            symbol: Some(symbol.into()),
            ..Default::default()
        }
    }
}

/// Body of `GET /marketdata/v1/instruments`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentsResponse {
    #[serde(default)]
    pub instruments: Vec<AccountInstrument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub short_quantity: Option<f64>,
    pub average_price: Option<f64>,
    pub current_day_profit_loss: Option<f64>,
    pub current_day_profit_loss_percentage: Option<f64>,
    pub long_quantity: Option<f64>,
    pub settled_long_quantity: Option<f64>,
    pub settled_short_quantity: Option<f64>,
    pub aged_quantity: Option<f64>,
    pub instrument: Option<AccountInstrument>,
    pub market_value: Option<f64>,
    pub maintenance_requirement: Option<f64>,
    pub average_long_price: Option<f64>,
    pub average_short_price: Option<f64>,
    pub tax_lot_average_long_price: Option<f64>,
    pub tax_lot_average_short_price: Option<f64>,
    pub long_open_profit_loss: Option<f64>,
    pub short_open_profit_loss: Option<f64>,
    pub previous_session_long_quantity: Option<f64>,
    pub previous_session_short_quantity: Option<f64>,
    pub current_day_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "type", default)]
    pub account_type: Option<AccountType>,
    pub account_number: String,
    #[serde(default)]
    pub round_trips: Option<i64>,
    #[serde(default)]
    pub is_day_trader: bool,
    #[serde(default)]
    pub is_closing_only_restricted: bool,
    #[serde(default)]
    pub pfcb_flag: bool,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub initial_balances: Option<Balance>,
    #[serde(default)]
    pub current_balances: Option<Balance>,
    #[serde(default)]
    pub projected_balances: Option<Balance>,
}

impl Account {
    pub fn is_margin(&self) -> bool {
        self.account_type == Some(AccountType::Margin)
    }

    pub fn is_cash(&self) -> bool {
        self.account_type == Some(AccountType::Cash)
    }
}

/// Envelope the accounts endpoints wrap each account in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritiesAccount {
    pub securities_account: Account,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLegCollection {
    pub order_leg_type: Option<AssetType>,
    pub leg_id: Option<i64>,
    pub instrument: Option<AccountInstrument>,
    pub instruction: Option<OrderLegInstruction>,
    pub position_effect: Option<PositionEffect>,
    pub quantity: Option<f64>,
    pub quantity_type: Option<QuantityType>,
}

impl OrderLegCollection {
    /// Leg trading `quantity` of `symbol`
    pub fn new(
        asset_type: AssetType,
        symbol: impl Into<String>,
        instruction: OrderLegInstruction,
        quantity: f64,
    ) -> Self {
        OrderLegCollection {
            order_leg_type: Some(asset_type),
            instrument: Some(AccountInstrument::new(asset_type, symbol)),
            instruction: Some(instruction),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn with_position_effect(mut self, effect: PositionEffect) -> Self {
        self.position_effect = Some(effect);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionLeg {
    pub leg_id: Option<i64>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub mismarked_quantity: Option<f64>,
    pub instrument_id: Option<i64>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderActivity {
    pub activity_type: Option<OrderActivityType>,
    pub execution_type: Option<ExecutionType>,
    pub quantity: Option<f64>,
    pub order_remaining_quantity: Option<f64>,
    pub execution_legs: Vec<ExecutionLeg>,
}

/// An order, both as submitted and as reported back by the order endpoints.
///
/// Fields only the server fills in (`order_id`, `status`, activity) stay
/// `None` or empty on submission and are dropped from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub session: Session,
    pub duration: OrderDuration,
    pub order_type: OrderType,
    pub cancel_time: Option<String>,
    pub complex_order_strategy_type: Option<ComplexOrderStrategyType>,
    pub quantity: Option<f64>,
    pub filled_quantity: Option<f64>,
    pub remaining_quantity: Option<f64>,
    pub requested_destination: Option<Destination>,
    pub destination_link_name: Option<String>,
    pub release_time: Option<String>,
    pub stop_price: Option<f64>,
    pub stop_price_link_basis: Option<PriceLinkBasis>,
    pub stop_price_link_type: Option<PriceLinkType>,
    pub stop_price_offset: Option<f64>,
    pub stop_type: Option<StopType>,
    pub price_link_basis: Option<PriceLinkBasis>,
    pub price_link_type: Option<PriceLinkType>,
    /// Absent for market orders
    pub price: Option<f64>,
    pub tax_lot_method: Option<TaxLotMethod>,
    pub order_leg_collection: Vec<OrderLegCollection>,
    pub activation_price: Option<f64>,
    pub special_instruction: Option<SpecialInstruction>,
    pub order_strategy_type: Option<OrderStrategyType>,
    pub order_id: Option<i64>,
    pub cancelable: Option<bool>,
    pub editable: Option<bool>,
    pub status: Option<OrderStatus>,
    pub entered_time: Option<String>,
    pub close_time: Option<String>,
    pub tag: Option<String>,
    pub account_number: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_activity_collection: Vec<OrderActivity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replacing_order_collection: Vec<Order>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_order_strategies: Vec<Order>,
    pub status_description: Option<String>,
}

impl Order {
    /// Single order in the normal session
    pub fn new(order_type: OrderType, duration: OrderDuration) -> Self {
        Order {
            order_type,
            duration,
            order_strategy_type: Some(OrderStrategyType::Single),
            ..Default::default()
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_complex_strategy(mut self, strategy: ComplexOrderStrategyType) -> Self {
        self.complex_order_strategy_type = Some(strategy);
        self
    }

    pub fn with_leg(mut self, leg: OrderLegCollection) -> Self {
        self.order_leg_collection.push(leg);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::to_compact_json;
    use serde_json::json;

    #[test]
    fn test_parse_securities_account() {
        let accounts: Vec<SecuritiesAccount> = serde_json::from_value(json!([{
            "securitiesAccount": {
                "type": "MARGIN",
                "accountNumber": "123",
                "roundTrips": 0,
                "isDayTrader": false,
                "isClosingOnlyRestricted": false,
                "pfcbFlag": false,
                "positions": [{
                    "shortQuantity": 0.0,
                    "averagePrice": 4.5,
                    "longQuantity": 2.0,
                    "instrument": {
                        "assetType": "OPTION",
                        "cusip": "0SPXW.GF40005530000",
                        "symbol": "SPXW  240701C05530000",
                        "putCall": "CALL",
                        "type": "VANILLA",
                        "underlyingSymbol": "$SPX"
                    },
                    "marketValue": 900.0
                }],
                "initialBalances": {
                    "accruedInterest": 0.0, "cashBalance": 1200.5, "isInCall": false
                },
                "currentBalances": {"availableFunds": 1000.0, "buyingPower": 2000.0}
            }
        }]))
        .unwrap();

        assert_eq!(accounts.len(), 1);
        let account = &accounts[0].securities_account;
        assert_eq!(account.account_number, "123");
        assert!(account.is_margin());
        assert!(!account.is_cash());
        assert_eq!(account.round_trips, Some(0));
        assert_eq!(account.positions.len(), 1);
        let instrument = account.positions[0].instrument.as_ref().unwrap();
        assert_eq!(instrument.asset_type, Some(AssetType::Option));
        assert_eq!(instrument.put_call, Some(OptionContractType::Call));
        assert_eq!(instrument.option_type, Some(OptionType::Vanilla));
        assert_eq!(account.initial_balances.as_ref().unwrap().cash_balance, Some(1200.5));
        assert!(account.projected_balances.is_none());
    }

    #[test]
    fn test_parse_order_with_activity() {
        let order: Order = serde_json::from_value(json!({
            "session": "NORMAL",
            "duration": "DAY",
            "orderType": "LIMIT",
            "complexOrderStrategyType": "NONE",
            "quantity": 1.0,
            "filledQuantity": 1.0,
            "remainingQuantity": 0.0,
            "requestedDestination": "AUTO",
            "destinationLinkName": "AutoRoute",
            "price": 1.5,
            "orderLegCollection": [{
                "orderLegType": "EQUITY",
                "legId": 1,
                "instrument": {"assetType": "EQUITY", "symbol": "AAPL", "instrumentId": 1973757747},
                "instruction": "BUY",
                "positionEffect": "OPENING",
                "quantity": 1.0
            }],
            "orderStrategyType": "SINGLE",
            "orderId": 456,
            "cancelable": false,
            "editable": false,
            "status": "FILLED",
            "enteredTime": "2024-07-01T14:00:00+0000",
            "closeTime": "2024-07-01T14:00:01+0000",
            "accountNumber": 123,
            "orderActivityCollection": [{
                "activityType": "EXECUTION",
                "executionType": "FILL",
                "quantity": 1.0,
                "orderRemainingQuantity": 0.0,
                "executionLegs": [{
                    "legId": 1, "price": 1.5, "quantity": 1.0, "mismarkedQuantity": 0.0,
                    "instrumentId": 1973757747, "time": "2024-07-01T14:00:01+0000"
                }]
            }]
        }))
        .unwrap();

        assert_eq!(order.order_id, Some(456));
        assert_eq!(order.cancelable, Some(false));
        assert_eq!(order.status, Some(OrderStatus::Filled));
        assert_eq!(order.order_activity_collection[0].execution_legs[0].price, Some(1.5));
        assert_eq!(order.order_leg_collection[0].instruction, Some(OrderLegInstruction::Buy));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: OrderStatus = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        assert_eq!(OrderStatus::PendingAcknowledgement.as_str(), "PENDING_ACKNOWLEDGEMENT");
    }

    #[test]
    fn test_butterfly_order_body() {
        let order = Order::new(OrderType::NetDebit, OrderDuration::GoodTillCancel)
            .with_complex_strategy(ComplexOrderStrategyType::Butterfly)
            .with_price(0.9)
            .with_leg(
                OrderLegCollection::new(
                    AssetType::Option,
                    "SPXW  240701C05530000",
                    OrderLegInstruction::BuyToOpen,
                    1.0,
                )
                .with_position_effect(PositionEffect::Opening),
            )
            .with_leg(
                OrderLegCollection::new(
                    AssetType::Option,
                    "SPXW  240701C05540000",
                    OrderLegInstruction::SellToOpen,
                    2.0,
                )
                .with_position_effect(PositionEffect::Opening),
            );

        let body = to_compact_json(&order).unwrap();
        assert_eq!(body["orderType"], "NET_DEBIT");
        assert_eq!(body["duration"], "GOOD_TILL_CANCEL");
        assert_eq!(body["complexOrderStrategyType"], "BUTTERFLY");
        assert_eq!(body["orderStrategyType"], "SINGLE");
        assert_eq!(body["price"], 0.9);
        assert_eq!(body["orderLegCollection"][1]["quantity"], 2.0);
        assert_eq!(body["orderLegCollection"][1]["instrument"]["symbol"], "SPXW  240701C05540000");
        assert!(body.get("orderId").is_none());
        assert!(body.get("orderActivityCollection").is_none());
        assert!(body["orderLegCollection"][0].get("legId").is_none());
    }

    #[test]
    fn test_instrument_projection_names() {
        assert_eq!(InstrumentProjection::default().as_str(), "fundamental");
        assert_eq!(
            serde_json::to_value(InstrumentProjection::SymbolSearch).unwrap(),
            json!("symbol-search")
        );
    }
}
