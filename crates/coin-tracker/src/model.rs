//! Domain Models
//!
//! Core data types for price tracking, forecasting and the purchase ledger.
//! Ledger money uses `rust_decimal`; market prices and model math stay `f64`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::coins::find_coin;

/// Current prices keyed by coin key ("btc" → 97500.0).
/// A missing key means the price is unknown, never zero.
pub type PriceMap = HashMap<String, f64>;

/// A complete price set from one refresh cycle
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceSnapshot {
    /// Prices of the coins that were fetched successfully
    pub prices: PriceMap,

    /// When the refresh that produced this set completed
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(prices: PriceMap, fetched_at: DateTime<Utc>) -> Self {
        Self { prices, fetched_at }
    }

    pub fn get(&self, coin_key: &str) -> Option<f64> {
        self.prices.get(coin_key).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Daily price/volume history for one coin, oldest first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoricalSeries {
    pub prices: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl HistoricalSeries {
    /// Build a series, truncating both sides to the common most-recent length
    pub fn new(mut prices: Vec<f64>, mut volumes: Vec<f64>) -> Self {
        let len = prices.len().min(volumes.len());
        prices.drain(..prices.len() - len);
        volumes.drain(..volumes.len() - len);
        Self { prices, volumes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The last `n` points
    pub fn most_recent(&self, n: usize) -> Self {
        let prices_from = self.prices.len().saturating_sub(n);
        let volumes_from = self.volumes.len().saturating_sub(n);
        Self::new(
            self.prices[prices_from..].to_vec(),
            self.volumes[volumes_from..].to_vec(),
        )
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// How a future price was obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Random-forest prediction over historical features
    Model,
    /// Flat growth assumption used when modeling was not possible
    FlatHeuristic,
}

/// Projected outcome of investing in one coin
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Coin key
    pub coin: String,
    pub current_price: f64,
    pub future_price: f64,
    /// Expected gain on the investment, in the investment's currency
    pub profit: f64,
    pub method: ForecastMethod,
}

/// One recorded purchase
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Upper-cased coin symbol (e.g. "BTC")
    pub coin: String,

    /// Quantity bought
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Total paid, in USD
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,

    /// Day of purchase
    pub date: NaiveDate,
}

impl PurchaseRecord {
    pub fn new(coin: impl Into<String>, amount: Decimal, cost: Decimal, date: NaiveDate) -> Self {
        Self {
            coin: coin.into().to_uppercase(),
            amount,
            cost,
            date,
        }
    }

    /// Coin key used by price maps
    pub fn coin_key(&self) -> String {
        self.coin.to_lowercase()
    }
}

/// Aggregated position in one coin
#[derive(Clone, Debug, Serialize)]
pub struct Holding {
    /// Upper-cased coin symbol
    pub symbol: String,

    /// Total quantity across purchases
    pub amount: Decimal,

    /// Total paid across purchases
    pub cost: Decimal,

    /// Current unit price, if known
    pub price: Option<Decimal>,

    /// amount * price
    pub current_value: Option<Decimal>,

    /// current_value - cost
    pub profit: Option<Decimal>,

    /// profit / cost * 100
    pub profit_percent: Option<Decimal>,
}

impl Holding {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            amount: Decimal::ZERO,
            cost: Decimal::ZERO,
            price: None,
            current_value: None,
            profit: None,
            profit_percent: None,
        }
    }

    pub fn add(&mut self, record: &PurchaseRecord) {
        self.amount = self.amount.saturating_add(record.amount);
        self.cost = self.cost.saturating_add(record.cost);
    }

    /// Revalue with a current unit price.
    /// Returns false, leaving the holding unvalued, if the figures overflow.
    pub fn update_price(&mut self, price: Decimal) -> bool {
        let Some((value, profit, percent)) = valuation(self.amount, self.cost, price) else {
            return false;
        };

        self.price = Some(price);
        self.current_value = Some(value);
        self.profit = Some(profit);
        self.profit_percent = Some(percent);
        true
    }

    pub fn emoji(&self) -> &'static str {
        find_coin(&self.symbol).map_or("•", |c| c.emoji)
    }
}

/// Value, profit and profit percent, or None on overflow
fn valuation(amount: Decimal, cost: Decimal, price: Decimal) -> Option<(Decimal, Decimal, Decimal)> {
    let value = amount.checked_mul(price)?;
    let profit = value.checked_sub(cost)?;
    let percent = percent_of(profit, cost)?;
    Some((value, profit, percent))
}

/// `part / whole * 100`, zero when `whole` is not positive
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole > Decimal::ZERO {
        part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Portfolio valued at a set of current prices
#[derive(Clone, Debug, Default, Serialize)]
pub struct Portfolio {
    /// Holdings in order of first purchase
    pub holdings: Vec<Holding>,

    /// Sum of all purchase costs
    pub total_invested: Decimal,

    /// Sum of costs of holdings whose price is known
    pub priced_cost: Decimal,

    /// Sum of current values of holdings whose price is known
    pub total_current: Decimal,
}

impl Portfolio {
    /// Aggregate purchases per coin and value them at `prices`
    pub fn value(purchases: &[PurchaseRecord], prices: &PriceMap) -> Self {
        let mut holdings: Vec<Holding> = Vec::new();

        for record in purchases {
            let symbol = record.coin.to_uppercase();
            let index = match holdings.iter().position(|h| h.symbol == symbol) {
                Some(index) => index,
                None => {
                    holdings.push(Holding::new(&symbol));
                    holdings.len() - 1
                }
            };
            holdings[index].add(record);
        }

        let mut portfolio = Self::default();
        for mut holding in holdings {
            portfolio.total_invested = portfolio.total_invested.saturating_add(holding.cost);

            let price = prices
                .get(&holding.symbol.to_lowercase())
                .and_then(|&p| Decimal::try_from(p).ok());

            match price {
                Some(price) if holding.update_price(price) => {
                    portfolio.priced_cost = portfolio.priced_cost.saturating_add(holding.cost);
                    portfolio.total_current = portfolio
                        .total_current
                        .saturating_add(holding.current_value.unwrap_or_default());
                }
                Some(_) => {
                    tracing::warn!(coin = %holding.symbol, "Holding too large to value, left unvalued");
                }
                None => {
                    tracing::warn!(coin = %holding.symbol, "Price unknown, holding left unvalued");
                }
            }

            portfolio.holdings.push(holding);
        }

        portfolio
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Profit over the holdings that could be valued
    pub fn total_profit(&self) -> Decimal {
        self.total_current - self.priced_cost
    }

    /// None if the percentage overflows
    pub fn total_profit_percent(&self) -> Option<Decimal> {
        percent_of(self.total_profit(), self.priced_cost)
    }

    /// Holdings that could not be valued
    pub fn unpriced(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter().filter(|h| h.price.is_none())
    }
}
