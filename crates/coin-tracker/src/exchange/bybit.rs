//! Bybit spot ticker client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;

use super::{PriceSource, RetryPolicy};
use crate::coins::CoinSpec;
use crate::error::{Result, TrackerError};

const TICKERS_PATH: &str = "/v5/market/tickers";

/// Fetches last traded spot prices from the Bybit v5 API
pub struct BybitTickerClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BybitTickerClient {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Build around a pre-configured HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(&self, coin: &CoinSpec) -> Result<f64> {
        let url = format!("{}{}", self.base_url, TICKERS_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("category", "spot"), ("symbol", coin.ticker_symbol)])
            .send()
            .await?;

        let status = response.status();
        tracing::info!(coin = coin.symbol_key, symbol = coin.ticker_symbol, status = status.as_u16(), "Ticker request");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(coin = coin.symbol_key, %body, "Ticker API error");
            return Err(TrackerError::HttpStatus {
                coin: coin.symbol_key.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: TickerResponse = response.json().await?;
        tracing::debug!(coin = coin.symbol_key, ?payload, "Ticker payload");
        payload.into_price(coin.symbol_key)
    }
}

#[async_trait]
impl PriceSource for BybitTickerClient {
    async fn fetch_price(&self, coin: &CoinSpec) -> Result<f64> {
        let mut attempt = 1;

        loop {
            match self.fetch_once(coin).await {
                Ok(price) => {
                    tracing::info!(coin = coin.symbol_key, price, "Price fetched");
                    return Ok(price);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(
                        coin = coin.symbol_key,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Ticker fetch failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(coin = coin.symbol_key, attempt, error = %err, "Ticker fetch gave up");
                    return Err(err);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "Bybit"
    }
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(rename = "retCode")]
    ret_code: Option<i64>,

    #[serde(rename = "retMsg", default)]
    ret_msg: String,

    #[serde(default)]
    result: Option<TickerResult>,
}

#[derive(Debug, Deserialize)]
struct TickerResult {
    #[serde(default)]
    list: Vec<TickerItem>,
}

#[derive(Debug, Deserialize)]
struct TickerItem {
    #[serde(rename = "lastPrice")]
    last_price: Option<serde_json::Value>,
}

impl TickerResponse {
    fn into_price(self, coin: &str) -> Result<f64> {
        let malformed = |reason: &str| TrackerError::MalformedResponse {
            coin: coin.to_string(),
            reason: reason.to_string(),
        };

        let code = self.ret_code.ok_or_else(|| malformed("missing retCode"))?;
        if code != 0 {
            return Err(TrackerError::ApiRejected {
                coin: coin.to_string(),
                code,
                message: self.ret_msg,
            });
        }

        let item = self
            .result
            .and_then(|r| r.list.into_iter().next())
            .ok_or_else(|| TrackerError::NoResult(coin.to_string()))?;

        // Bybit sends prices as strings; accept bare numbers as well
        let price = match item.last_price {
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
        .ok_or_else(|| malformed("missing or non-numeric lastPrice"))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(malformed("non-positive lastPrice"));
        }

        Ok(price)
    }
}
