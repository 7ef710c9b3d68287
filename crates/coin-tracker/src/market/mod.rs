//! Historical Market Data
//!
//! Daily price/volume history used to train the forecast model.

mod coingecko;
mod fixed;

pub use coingecko::CoinGeckoClient;
pub use fixed::FixedHistorySource;

use async_trait::async_trait;

use crate::model::HistoricalSeries;

/// Source of daily history for one coin.
///
/// Best effort: failures are logged by the implementation and come back as
/// an empty series, so callers only ever see "enough data" or "not enough".
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Up to `days` most recent daily points, oldest first
    async fn fetch_history(&self, external_id: &str, days: u32) -> HistoricalSeries;
}
