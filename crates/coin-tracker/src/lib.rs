//! # coin-tracker
//!
//! Personal crypto purchase tracker with a cached live price feed and a
//! 7-day profit forecast.
//!
//! ## Data flow
//!
//! ```text
//!  Bybit tickers ──▶ PriceSource (retry) ──▶ PriceCache ──┬──▶ Portfolio valuation
//!                                              ▲          │
//!                                  RefreshJob ─┘          └──▶ ForecastEngine ──▶ ranked profits
//!                                                                   ▲
//!  CoinGecko market_chart ──▶ HistorySource ──▶ FeatureBuilder ─────┘
//!
//!  portfolio.json ◀──▶ Ledger
//! ```
//!
//! ## Example: 7-day forecast for $100
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  SOL   current $150.00  → $168.00   profit $12.00   ✔    │
//! │  ETH   current $3450.00 → $3795.00  profit $10.00   ✔    │
//! │  BTC   current $50000   → $52500    profit $5.00    ✘    │
//! └──────────────────────────────────────────────────────────┘
//!   Coins below $10 projected profit are not recommended.
//! ```

pub mod cache;
pub mod coins;
pub mod config;
pub mod error;
pub mod exchange;
pub mod features;
pub mod forecast;
pub mod ledger;
pub mod market;
pub mod model;
pub mod refresh;
pub mod report;
pub mod service;
pub mod svckit;

pub use cache::PriceCache;
pub use coins::{CoinSpec, SUPPORTED_COINS, find_coin};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use forecast::{ForecastConfig, ForecastEngine};
pub use ledger::Ledger;
pub use model::{ForecastMethod, ForecastResult, HistoricalSeries, Portfolio, PriceMap, PriceSnapshot, PurchaseRecord};
pub use refresh::RefreshJob;
pub use service::Tracker;

/// Re-export commands for easy registration
pub mod commands {
    pub use crate::svckit::{
        AddPurchaseCommand, ForecastCommand, HistoryCommand, PortfolioCommand, PriceLookupCommand,
        register_all,
    };
}
