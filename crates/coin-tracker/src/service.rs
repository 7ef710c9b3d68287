//! Tracker Context
//!
//! One `Tracker` per process owns the price cache, the purchase ledger and
//! the forecast engine. Front-ends share it behind an `Arc`.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::cache::PriceCache;
use crate::coins::find_coin;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::exchange::BybitTickerClient;
use crate::forecast::ForecastEngine;
use crate::ledger::Ledger;
use crate::market::CoinGeckoClient;
use crate::model::{ForecastResult, Portfolio, PriceMap, PurchaseRecord};
use crate::report;

pub struct Tracker {
    cache: Arc<PriceCache>,
    ledger: Ledger,
    engine: ForecastEngine,
}

impl Tracker {
    pub fn new(cache: Arc<PriceCache>, ledger: Ledger, engine: ForecastEngine) -> Self {
        Self { cache, ledger, engine }
    }

    /// Wire up the live Bybit and CoinGecko clients and load the ledger
    pub async fn from_config(config: &TrackerConfig) -> Result<Self> {
        let ticker = BybitTickerClient::new(&config.ticker_base_url, config.request_timeout)?;
        let history = CoinGeckoClient::new(&config.history_base_url, config.request_timeout)?;

        let cache = Arc::new(PriceCache::new(Arc::new(ticker), config.fresh_window));
        let ledger = Ledger::load(&config.ledger_path).await;
        let engine = ForecastEngine::new(Arc::new(history));

        Ok(Self::new(cache, ledger, engine))
    }

    /// Shared handle for the background refresh job
    pub fn cache(&self) -> Arc<PriceCache> {
        Arc::clone(&self.cache)
    }

    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    /// Current prices; empty when nothing could be fetched
    pub async fn get_current_prices(&self) -> PriceMap {
        self.cache.get_prices().await
    }

    /// Validate and append a purchase
    pub async fn record_purchase(
        &self,
        coin: &str,
        amount: Decimal,
        cost: Decimal,
        date: NaiveDate,
    ) -> Result<PurchaseRecord> {
        let spec = find_coin(coin).ok_or_else(|| TrackerError::UnsupportedCoin(coin.trim().to_string()))?;
        validate_purchase(amount, cost)?;

        let record = PurchaseRecord::new(spec.symbol(), amount, cost, date);
        self.ledger.record_purchase(record.clone()).await;
        Ok(record)
    }

    pub async fn list_purchases(&self) -> Vec<PurchaseRecord> {
        self.ledger.list_purchases().await
    }

    /// Holdings valued at current prices
    pub async fn portfolio(&self) -> Portfolio {
        let purchases = self.ledger.list_purchases().await;
        if purchases.is_empty() {
            return Portfolio::default();
        }

        let prices = self.get_current_prices().await;
        Portfolio::value(&purchases, &prices)
    }

    /// Ranked recommendations for `investment`
    pub async fn forecast(&self, investment: f64) -> Result<Vec<ForecastResult>> {
        let investment = validate_investment(investment)?;

        let prices = self.get_current_prices().await;
        if prices.is_empty() {
            return Err(TrackerError::PriceUnavailable("all coins".into()));
        }

        Ok(self.engine.forecast(investment, &prices).await)
    }

    /// Forecast rendered for chat
    pub async fn run_forecast(&self, investment: f64) -> String {
        match self.forecast(investment).await {
            Ok(recommendations) => {
                report::forecast_report(&recommendations, self.engine.config().horizon_days)
            }
            Err(err) => err.user_message(),
        }
    }

    pub async fn prices_report(&self) -> String {
        report::prices_report(&self.get_current_prices().await)
    }

    pub async fn portfolio_report(&self) -> String {
        report::portfolio_report(&self.portfolio().await)
    }

    pub async fn history_report(&self) -> String {
        report::history_report(&self.list_purchases().await)
    }
}

/// amount > 0, cost >= 0
pub fn validate_purchase(amount: Decimal, cost: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(TrackerError::InvalidInput("Amount must be greater than zero".into()));
    }
    if cost < Decimal::ZERO {
        return Err(TrackerError::InvalidInput("Cost cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_investment(investment: f64) -> Result<f64> {
    if investment.is_finite() && investment > 0.0 {
        Ok(investment)
    } else {
        Err(TrackerError::InvalidInput("Investment must be a positive amount".into()))
    }
}

/// Parse a chat number into a ledger value
pub fn parse_decimal(text: &str) -> Result<Decimal> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| TrackerError::InvalidInput(format!("'{}' is not a number", text.trim())))?;
    decimal_from_f64(value)
}

pub fn decimal_from_f64(value: f64) -> Result<Decimal> {
    Decimal::try_from(value).map_err(|_| TrackerError::InvalidInput(format!("{} is not a valid amount", value)))
}

/// Parse the chat form `AMOUNT COST` (e.g. "100 500")
pub fn parse_purchase_entry(text: &str) -> Result<(Decimal, Decimal)> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [amount, cost] = parts.as_slice() else {
        return Err(TrackerError::InvalidInput(
            "Invalid format. Expected: AMOUNT COST, e.g. 100 500".into(),
        ));
    };

    let amount = parse_decimal(amount)?;
    let cost = parse_decimal(cost)?;
    validate_purchase(amount, cost)?;
    Ok((amount, cost))
}

/// Parse a chat investment amount (e.g. "100")
pub fn parse_investment(text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| TrackerError::InvalidInput("Invalid amount. Example: 100".into()))?;
    validate_investment(value)
}
