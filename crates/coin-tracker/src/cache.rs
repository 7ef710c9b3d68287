//! Price Cache
//!
//! Holds the last successful price set. Fresh sets are served without any
//! network call; when a refresh comes back empty, a stale set is still
//! served for one more window before the cache reports nothing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::RwLock;

use crate::coins::SUPPORTED_COINS;
use crate::exchange::PriceSource;
use crate::model::{PriceMap, PriceSnapshot};

/// Time-windowed cache in front of a [`PriceSource`]
pub struct PriceCache {
    source: Arc<dyn PriceSource>,
    fresh_window: Duration,
    snapshot: RwLock<Option<Arc<PriceSnapshot>>>,
}

impl PriceCache {
    pub fn new(source: Arc<dyn PriceSource>, fresh_window: Duration) -> Self {
        Self {
            source,
            fresh_window,
            snapshot: RwLock::new(None),
        }
    }

    /// Current prices, refreshing if the cached set is no longer fresh.
    /// Empty when nothing is known.
    pub async fn get_prices(&self) -> PriceMap {
        self.get_prices_at(Utc::now()).await
    }

    pub async fn get_prices_at(&self, now: DateTime<Utc>) -> PriceMap {
        self.snapshot_at(now)
            .await
            .map(|snapshot| snapshot.prices.clone())
            .unwrap_or_default()
    }

    /// Snapshot as seen at `now`, refreshing when it has gone stale
    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> Option<Arc<PriceSnapshot>> {
        if let Some(snapshot) = self.current().await {
            if age(&snapshot, now) < self.fresh_window {
                tracing::debug!(coins = snapshot.len(), "Serving cached prices");
                return Some(snapshot);
            }
        }

        self.refresh_at(now).await
    }

    /// Unconditionally fetch every coin and replace the snapshot with whatever succeeded.
    /// Coins that failed this cycle are dropped, not carried over.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Option<Arc<PriceSnapshot>> {
        let prices = self.fetch_all().await;

        if !prices.is_empty() {
            let snapshot = Arc::new(PriceSnapshot::new(prices, now));
            *self.snapshot.write().await = Some(Arc::clone(&snapshot));
            tracing::info!(
                coins = snapshot.len(),
                source = self.source.name(),
                "Prices updated"
            );
            return Some(snapshot);
        }

        match self.current().await {
            Some(old) if age(&old, now) < self.fresh_window * 2 => {
                tracing::warn!(
                    age_secs = age(&old, now).as_secs(),
                    "Refresh returned nothing, serving stale prices"
                );
                Some(old)
            }
            _ => {
                tracing::error!("Could not fetch prices and no usable cached set");
                None
            }
        }
    }

    /// The stored snapshot, without any freshness check
    pub async fn current(&self) -> Option<Arc<PriceSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// One concurrent fetch per coin; failures are isolated per coin
    async fn fetch_all(&self) -> PriceMap {
        let fetches = SUPPORTED_COINS.iter().map(|coin| async move {
            (coin.symbol_key, self.source.fetch_price(coin).await)
        });

        let mut prices = PriceMap::new();
        for (coin, result) in join_all(fetches).await {
            match result {
                Ok(price) if price > 0.0 => {
                    prices.insert(coin.to_string(), price);
                }
                Ok(price) => {
                    tracing::warn!(coin, price, "Discarding non-positive price");
                }
                Err(err) => {
                    tracing::error!(coin, error = %err, "No price this cycle");
                }
            }
        }

        prices
    }
}

fn age(snapshot: &PriceSnapshot, now: DateTime<Utc>) -> Duration {
    (now - snapshot.fetched_at).to_std().unwrap_or(Duration::ZERO)
}
