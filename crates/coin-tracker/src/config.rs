//! Runtime configuration
//!
//! Everything has a sensible default; environment variables override.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BYBIT_URL: &str = "https://api.bybit.com";
const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

/// Tracker configuration
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Base URL of the ticker API
    pub ticker_base_url: String,

    /// Base URL of the historical market-data API
    pub history_base_url: String,

    /// Per-request timeout for every outbound call
    pub request_timeout: Duration,

    /// How long a fetched price set stays fresh
    pub fresh_window: Duration,

    /// Where the purchase ledger is stored
    pub ledger_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ticker_base_url: DEFAULT_BYBIT_URL.into(),
            history_base_url: DEFAULT_COINGECKO_URL.into(),
            request_timeout: Duration::from_secs(10),
            fresh_window: Duration::from_secs(300),
            ledger_path: PathBuf::from("portfolio.json"),
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ticker_base_url: env_str("BYBIT_BASE_URL").unwrap_or(defaults.ticker_base_url),
            history_base_url: env_str("COINGECKO_BASE_URL").unwrap_or(defaults.history_base_url),
            request_timeout: env_secs("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.request_timeout),
            fresh_window: env_secs("PRICE_CACHE_SECS").unwrap_or(defaults.fresh_window),
            ledger_path: env_str("PORTFOLIO_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
        }
    }
}

fn env_str(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_str(name)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}
