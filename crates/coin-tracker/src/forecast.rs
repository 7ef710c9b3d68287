//! Profit Forecasting
//!
//! For every coin with a known price: fit a random forest on the last 30
//! days of features, project the series 7 days ahead at today's price and
//! read the model's estimate for the final day. When that is not possible
//! the coin is assumed to grow by a flat 5%.
//!
//! ```text
//! history ──▶ features ──▶ RandomForest ──▶ future price ──▶ profit ──▶ filter ≥ $10 ──▶ rank
//!    │  < 7 points / any error                     ▲
//!    └──────────────── price × 1.05 ───────────────┘
//! ```

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::coins::{CoinSpec, SUPPORTED_COINS};
use crate::error::{Result, TrackerError};
use crate::features::{SMA_WINDOW, build_features};
use crate::market::HistorySource;
use crate::model::{ForecastMethod, ForecastResult, HistoricalSeries, PriceMap};

/// Forecast tuning
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Days of history to train on
    pub history_days: u32,

    /// Days to project forward
    pub horizon_days: usize,

    /// Trees in the forest
    pub n_trees: usize,

    /// Seed so the same history gives the same forecast
    pub seed: u64,

    /// Growth factor assumed when the model cannot be used
    pub fallback_growth: f64,

    /// Smallest profit worth recommending
    pub min_profit: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_days: 30,
            horizon_days: 7,
            n_trees: 100,
            seed: 42,
            fallback_growth: 1.05,
            min_profit: 10.0,
        }
    }
}

/// Ranks supported coins by projected profit
pub struct ForecastEngine {
    history: Arc<dyn HistorySource>,
    coins: &'static [CoinSpec],
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(history: Arc<dyn HistorySource>) -> Self {
        Self::with_config(history, ForecastConfig::default())
    }

    pub fn with_config(history: Arc<dyn HistorySource>, config: ForecastConfig) -> Self {
        Self {
            history,
            coins: &SUPPORTED_COINS,
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Recommendations for `investment`, best first.
    /// Empty when no coin clears the minimum profit.
    pub async fn forecast(&self, investment: f64, prices: &PriceMap) -> Vec<ForecastResult> {
        let candidates: Vec<(&CoinSpec, f64)> = self
            .coins
            .iter()
            .filter_map(|coin| match prices.get(coin.symbol_key) {
                Some(&price) if price > 0.0 => Some((coin, price)),
                _ => {
                    tracing::warn!(coin = coin.symbol_key, "No price, skipping forecast");
                    None
                }
            })
            .collect();

        let results = join_all(
            candidates
                .into_iter()
                .map(|(coin, price)| self.forecast_coin(coin, price, investment)),
        )
        .await;

        rank(results, self.config.min_profit)
    }

    /// Forecast one coin. Never fails: any problem falls back to flat growth.
    pub async fn forecast_coin(&self, coin: &CoinSpec, current_price: f64, investment: f64) -> ForecastResult {
        let series = self
            .history
            .fetch_history(coin.external_id, self.config.history_days)
            .await;

        // Tree fitting is CPU-bound; keep it off the async workers
        let config = self.config.clone();
        let projection = tokio::task::spawn_blocking(move || project_series(&config, &series, current_price))
            .await
            .unwrap_or_else(|err| Err(TrackerError::Model(format!("forecast task failed: {}", err))));

        let (future_price, method) = match projection {
            Ok(price) => {
                tracing::info!(coin = coin.symbol_key, future_price = price, "Model forecast");
                (price, ForecastMethod::Model)
            }
            Err(err @ TrackerError::InsufficientHistory { .. }) => {
                tracing::info!(coin = coin.symbol_key, reason = %err, "Using flat growth");
                (current_price * self.config.fallback_growth, ForecastMethod::FlatHeuristic)
            }
            Err(err) => {
                tracing::error!(coin = coin.symbol_key, error = %err, "Model failed, using flat growth");
                (current_price * self.config.fallback_growth, ForecastMethod::FlatHeuristic)
            }
        };

        ForecastResult {
            coin: coin.symbol_key.to_string(),
            current_price,
            future_price,
            profit: expected_profit(current_price, future_price, investment),
            method,
        }
    }

    /// Model estimate of the price `horizon_days` from now
    pub fn project(&self, series: &HistoricalSeries, current_price: f64) -> Result<f64> {
        project_series(&self.config, series, current_price)
    }
}

fn project_series(config: &ForecastConfig, series: &HistoricalSeries, current_price: f64) -> Result<f64> {
    if series.len() < SMA_WINDOW {
        return Err(TrackerError::InsufficientHistory {
            needed: SMA_WINDOW,
            available: series.len(),
        });
    }

    let rows = build_features(&series.prices, &series.volumes)?;
    let x = DenseMatrix::from_2d_vec(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>());
    let y = series.prices.clone();

    let params = RandomForestRegressorParameters::default()
        .with_n_trees(config.n_trees)
        .with_seed(config.seed);
    let model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>> =
        RandomForestRegressor::fit(&x, &y, params)
            .map_err(|e| TrackerError::Model(format!("training failed: {}", e)))?;

    let last_volume = series.volumes.last().copied().unwrap_or_default();
    let horizon = config.horizon_days;
    let mut prices = series.prices.clone();
    prices.extend(std::iter::repeat_n(current_price, horizon));
    let mut volumes = series.volumes.clone();
    volumes.extend(std::iter::repeat_n(last_volume, horizon));

    let projected = build_features(&prices, &volumes)?;
    let target = projected
        .last()
        .ok_or_else(|| TrackerError::Model("empty projection".into()))?;

    let prediction = model
        .predict(&DenseMatrix::from_2d_vec(&vec![target.to_vec()]))
        .map_err(|e| TrackerError::Model(format!("prediction failed: {}", e)))?;

    match prediction.first().copied() {
        Some(price) if price.is_finite() && price > 0.0 => Ok(price),
        Some(price) => Err(TrackerError::Model(format!("unusable prediction {}", price))),
        None => Err(TrackerError::Model("model returned no prediction".into())),
    }
}

/// Gain from investing `investment` at `current_price` and selling at `future_price`
pub fn expected_profit(current_price: f64, future_price: f64, investment: f64) -> f64 {
    (future_price - current_price) * (investment / current_price)
}

/// Keep results with `profit >= min_profit`, highest profit first
pub fn rank(mut results: Vec<ForecastResult>, min_profit: f64) -> Vec<ForecastResult> {
    results.retain(|r| r.profit >= min_profit);
    results.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    results
}
