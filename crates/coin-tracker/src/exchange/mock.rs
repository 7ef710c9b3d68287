//! Mock Price Source
//!
//! For testing and offline demo runs. Returns static prices and can be
//! told to fail for chosen coins.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::PriceSource;
use crate::coins::CoinSpec;
use crate::error::{Result, TrackerError};

/// Mock price source with static prices
pub struct MockPriceSource {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl Default for MockPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPriceSource {
    /// Realistic prices for every supported coin
    pub fn new() -> Self {
        Self::with_prices([
            ("ton", 5.42),
            ("ada", 0.95),
            ("btc", 97500.0),
            ("eth", 3450.0),
            ("sol", 195.0),
            ("doge", 0.38),
        ])
    }

    pub fn with_prices<'a>(prices: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            prices: Mutex::new(
                prices
                    .into_iter()
                    .map(|(coin, price)| (coin.to_string(), price))
                    .collect(),
            ),
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Change the price served for a coin
    pub fn set_price(&self, coin: &str, price: f64) {
        if let Ok(mut prices) = self.prices.lock() {
            prices.insert(coin.to_string(), price);
        }
    }

    /// Make every fetch of `coin` fail
    pub fn fail(&self, coin: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(coin.to_string());
        }
    }

    /// Make every fetch of every coin fail
    pub fn fail_all(&self) {
        let coins: Vec<String> = self
            .prices
            .lock()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        for coin in coins {
            self.fail(&coin);
        }
    }

    /// Stop failing
    pub fn recover(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    /// Number of fetches attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_price(&self, coin: &CoinSpec) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing
            .lock()
            .map(|f| f.contains(coin.symbol_key))
            .unwrap_or(false);
        if failing {
            return Err(TrackerError::NoResult(coin.symbol_key.to_string()));
        }

        self.prices
            .lock()
            .ok()
            .and_then(|p| p.get(coin.symbol_key).copied())
            .ok_or_else(|| TrackerError::NoResult(coin.symbol_key.to_string()))
    }

    fn name(&self) -> &str {
        "MockExchange"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coins::find_coin;

    #[tokio::test]
    async fn test_mock_source() {
        let source = MockPriceSource::new();

        let btc = source.fetch_price(find_coin("btc").unwrap()).await.unwrap();
        assert!(btc > 0.0);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_coin() {
        let source = MockPriceSource::new();
        source.fail("eth");

        assert!(source.fetch_price(find_coin("eth").unwrap()).await.is_err());
        assert!(source.fetch_price(find_coin("sol").unwrap()).await.is_ok());

        source.recover();
        assert!(source.fetch_price(find_coin("eth").unwrap()).await.is_ok());
    }
}
