use std::sync::Arc;
use std::time::Duration;

use chat_core::{ChatError, CommandCall, CommandRegistry};
use chrono::NaiveDate;
use coin_tracker::exchange::MockPriceSource;
use coin_tracker::market::FixedHistorySource;
use coin_tracker::report::{NO_RECOMMENDATIONS, PRICES_UNAVAILABLE};
use coin_tracker::{
    ForecastEngine, HistoricalSeries, Ledger, PriceCache, SUPPORTED_COINS, Tracker, TrackerConfig,
    commands,
};
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;

fn ticker_price(symbol: &str) -> &'static str {
    match symbol {
        "TONUSDT" => "5.42",
        "ADAUSDT" => "0.95",
        "BTCUSDT" => "50000",
        "ETHUSDT" => "3450.5",
        "SOLUSDT" => "195",
        _ => "0.38",
    }
}

fn short_chart() -> serde_json::Value {
    json!({
        "prices": [[1_700_000_000_000i64, 1.0], [1_700_086_400_000i64, 1.1], [1_700_172_800_000i64, 1.2]],
        "total_volumes": [[1_700_000_000_000i64, 10.0], [1_700_086_400_000i64, 11.0], [1_700_172_800_000i64, 12.0]],
    })
}

#[tokio::test]
async fn tracker_over_http_values_and_forecasts() {
    let server = MockServer::start_async().await;
    let mut ticker_mocks = Vec::new();
    for coin in SUPPORTED_COINS.iter() {
        let price = ticker_price(coin.ticker_symbol);
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v5/market/tickers")
                    .query_param("category", "spot")
                    .query_param("symbol", coin.ticker_symbol);
                then.status(200).json_body(json!({
                    "retCode": 0,
                    "retMsg": "OK",
                    "result": { "category": "spot", "list": [{ "symbol": coin.ticker_symbol, "lastPrice": price }] }
                }));
            })
            .await;
        ticker_mocks.push(mock);
    }
    let history_mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/market_chart");
            then.status(200).json_body(short_chart());
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = TrackerConfig {
        ticker_base_url: server.base_url(),
        history_base_url: server.base_url(),
        ledger_path: dir.path().join("portfolio.json"),
        ..TrackerConfig::default()
    };
    let tracker = Tracker::from_config(&config).await.unwrap();

    let prices = tracker.get_current_prices().await;
    assert_eq!(prices.len(), 6);
    assert_eq!(prices["btc"], 50000.0);

    // Served from cache: no second round of ticker calls
    let again = tracker.get_current_prices().await;
    assert_eq!(again, prices);
    for mock in &ticker_mocks {
        mock.assert_hits_async(1).await;
    }

    tracker
        .record_purchase("btc", dec!(0.5), dec!(20000), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        .await
        .unwrap();
    let report = tracker.portfolio_report().await;
    assert!(report.contains("Profit: +5000.00$ (+25.00%)"), "{report}");

    // Three history points is too short for the model: flat 5% for every coin
    assert_eq!(tracker.run_forecast(100.0).await, NO_RECOMMENDATIONS);
    let text = tracker.run_forecast(1000.0).await;
    for coin in SUPPORTED_COINS.iter() {
        assert!(text.contains(&coin.symbol()), "{text}");
    }
    history_mock.assert_hits_async(12).await;
}

#[tokio::test]
async fn ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrackerConfig {
        ledger_path: dir.path().join("portfolio.json"),
        ..TrackerConfig::default()
    };
    let day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

    let first = Tracker::from_config(&config).await.unwrap();
    first.record_purchase("sol", dec!(2), dec!(300), day).await.unwrap();
    first.record_purchase("Doge", dec!(1000), dec!(380), day).await.unwrap();

    let second = Tracker::from_config(&config).await.unwrap();
    let purchases = second.list_purchases().await;
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[1].coin, "DOGE");
    assert!(second.history_report().await.contains("2. 2024-06-02 - 🐶 1000 DOGE for $380.00"));
}

async fn offline_registry(dir: &tempfile::TempDir, source: Arc<MockPriceSource>) -> CommandRegistry {
    let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let history = FixedHistorySource::new().with_series("solana", HistoricalSeries::new(rising, vec![1.0e6; 30]));

    let cache = Arc::new(PriceCache::new(source, Duration::from_secs(300)));
    let ledger = Ledger::load(dir.path().join("portfolio.json")).await;
    let tracker = Arc::new(Tracker::new(cache, ledger, ForecastEngine::new(Arc::new(history))));

    let mut registry = CommandRegistry::new();
    commands::register_all(&mut registry, &tracker);
    registry
}

#[tokio::test]
async fn chat_commands_drive_the_tracker() {
    let dir = tempfile::tempdir().unwrap();
    let registry = offline_registry(&dir, Arc::new(MockPriceSource::new())).await;
    assert_eq!(registry.names(), vec!["add_purchase", "forecast", "history", "portfolio", "prices"]);

    let added = registry
        .execute(&CommandCall::new("add_purchase").with_arg("coin", json!("ton")).with_arg("entry", json!("100 500")))
        .await
        .unwrap();
    assert!(added.success);
    assert_eq!(added.text, "💎 ✅ Added 100 TON for $500.00");

    let added = registry
        .execute(
            &CommandCall::new("add_purchase")
                .with_arg("coin", json!("ETH"))
                .with_arg("amount", json!(0.25))
                .with_arg("cost", json!("800")),
        )
        .await
        .unwrap();
    assert!(added.success);

    let history = registry.execute(&CommandCall::new("history")).await.unwrap();
    assert!(history.text.contains("1. "));
    assert!(history.text.contains("⧫ 0.25 ETH for $800.00"));

    let portfolio = registry.execute(&CommandCall::new("portfolio")).await.unwrap();
    assert!(portfolio.text.contains("💎 *TON*"));
    assert!(portfolio.text.contains("💰 *Total:*\nInvested: $1300.00"));

    let forecast = registry
        .execute(&CommandCall::new("forecast").with_arg("investment", json!("1000")))
        .await
        .unwrap();
    assert!(forecast.success);
    assert!(forecast.text.starts_with("📈"));

    let help = registry.execute(&CommandCall::new("help")).await.unwrap();
    assert!(help.text.contains("`add_purchase`"));
}

#[tokio::test]
async fn chat_commands_reject_bad_input_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let registry = offline_registry(&dir, Arc::new(MockPriceSource::new())).await;

    let bad_entry = registry
        .execute(&CommandCall::new("add_purchase").with_arg("coin", json!("btc")).with_arg("entry", json!("100")))
        .await;
    assert!(matches!(bad_entry, Err(ChatError::Validation(_))));

    let unsupported = registry
        .execute(&CommandCall::new("add_purchase").with_arg("coin", json!("xrp")).with_arg("entry", json!("1 1")))
        .await;
    assert!(matches!(unsupported, Err(ChatError::Validation(_))));

    let negative = registry
        .execute(&CommandCall::new("forecast").with_arg("investment", json!(-5)))
        .await;
    assert!(matches!(negative, Err(ChatError::Validation(_))));

    let not_a_number = registry
        .execute(&CommandCall::new("forecast").with_arg("investment", json!("lots")))
        .await;
    assert!(matches!(not_a_number, Err(ChatError::Parse(_))));

    let history = registry.execute(&CommandCall::new("history")).await.unwrap();
    assert_eq!(history.text, "📜 History is empty");
}

#[tokio::test]
async fn forecast_reports_unavailable_prices() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(MockPriceSource::new());
    source.fail_all();
    let registry = offline_registry(&dir, source).await;

    let reply = registry
        .execute(&CommandCall::new("forecast").with_arg("investment", json!(100)))
        .await
        .unwrap();
    assert!(!reply.success);
    assert_eq!(reply.text, PRICES_UNAVAILABLE);
}
