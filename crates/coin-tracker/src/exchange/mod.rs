//! Exchange Integration
//!
//! Spot-price sources for the supported coins.

mod bybit;
mod mock;

pub use bybit::BybitTickerClient;
pub use mock::MockPriceSource;

use std::time::Duration;

use async_trait::async_trait;

use crate::coins::CoinSpec;
use crate::error::Result;

/// Source of current spot prices (Strategy pattern)
///
/// One call fetches one coin. Implementations own their retry policy;
/// an `Err` means the coin has no price this cycle.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Get the current price for a coin. Always > 0 on success.
    async fn fetch_price(&self, coin: &CoinSpec) -> Result<f64>;

    /// Source name
    fn name(&self) -> &str;
}

/// Bounded retry with clamped exponential backoff
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Backoff multiplier
    pub base_delay: Duration,

    /// Lower bound for any wait
    pub min_delay: Duration,

    /// Upper bound for any wait
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Wait before the attempt following failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self.base_delay.saturating_mul(1u32 << exponent);
        raw.clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }
}
