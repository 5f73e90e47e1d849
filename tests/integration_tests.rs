//! Live checks against the real API.
//!
//! They need `SCHWAB_CLIENT_ID`, `SCHWAB_CLIENT_SECRET` and a token file from
//! a completed login (`SCHWAB_TOKEN_FILE`, default `tokens.json`).

use chrono::{Duration, Utc};
use schwab_client::models::{InstrumentProjection, MarketType, OptionContractType};
use schwab_client::{Config, SchwabClient, TokenState};

fn live_client() -> anyhow::Result<SchwabClient> {
    Ok(SchwabClient::new(Config::from_env()?)?)
}

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_tests -- --ignored
async fn test_token_is_usable() -> anyhow::Result<()> {
    let client = live_client()?;

    let token = client.token_manager().ensure_valid(false).await?;
    assert!(token.is_access_token_valid());
    assert_eq!(client.token_manager().state().await, TokenState::Valid);

    println!("Token valid, issued at {}", token.created_at);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_accounts_and_orders() -> anyhow::Result<()> {
    let client = live_client()?;

    let numbers = client.get_account_numbers().await?;
    assert!(!numbers.is_empty(), "expected at least one linked account");

    let account = client
        .get_single_account(&numbers[0], true)
        .await?
        .expect("linked account should be readable");
    assert_eq!(account.account_number, numbers[0].account_number);

    let orders = client
        .get_orders(
            &numbers[0].hash_value,
            Utc::now() - Duration::days(7),
            Utc::now(),
            100,
            None,
        )
        .await?;

    println!(
        "Account {}: {} positions, {} orders this week",
        account.account_number,
        account.positions.len(),
        orders.len()
    );
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_market_data() -> anyhow::Result<()> {
    let client = live_client()?;

    let hours = client.get_market_hour_info(Some(MarketType::Equity), None).await?;
    println!("Equity market open: {}", hours.is_equity_market_open());

    let instruments = client.get_instruments("AAPL", InstrumentProjection::Fundamental).await?;
    assert!(!instruments.is_empty(), "expected AAPL to be found");

    let expirations = client.get_option_expirations("$SPX").await?;
    assert!(!expirations.is_empty(), "expected SPX expirations");

    let first = chrono::NaiveDate::parse_from_str(&expirations[0].expiration_date, "%Y-%m-%d")?;
    let chain = client
        .download_option_chain("$SPX", first, first, OptionContractType::All)
        .await?;
    for expiration in chain.rows_by_expiration(true) {
        println!(
            "{} {}: {} calls, {} puts",
            expiration.underlying_symbol,
            expiration.expiration,
            expiration.calls.len(),
            expiration.puts.len()
        );
    }
    Ok(())
}
