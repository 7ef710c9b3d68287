//! CoinGecko `market_chart` client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::HistorySource;
use crate::error::{Result, TrackerError};
use crate::model::HistoricalSeries;

/// Fetches daily USD price and volume history from CoinGecko.
/// Requests are made once; there is no retry.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn request_market_chart(&self, external_id: &str, days: u32) -> Result<HistoricalSeries> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, external_id);
        let query = [
            ("vs_currency", "usd".to_string()),
            ("days", days.to_string()),
            ("interval", "daily".to_string()),
        ];

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        tracing::info!(coin = external_id, status = status.as_u16(), "History request");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(coin = external_id, %body, "History API error");
            return Err(TrackerError::HttpStatus {
                coin: external_id.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: MarketChartResponse = response.json().await?;
        Ok(payload.into_series(days as usize))
    }
}

#[async_trait]
impl HistorySource for CoinGeckoClient {
    async fn fetch_history(&self, external_id: &str, days: u32) -> HistoricalSeries {
        match self.request_market_chart(external_id, days).await {
            Ok(series) => {
                tracing::info!(coin = external_id, points = series.len(), "History fetched");
                series
            }
            Err(err) => {
                tracing::error!(coin = external_id, error = %err, "History unavailable");
                HistoricalSeries::empty()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<[f64; 2]>,
    #[serde(default)]
    total_volumes: Vec<[f64; 2]>,
}

impl MarketChartResponse {
    fn into_series(self, days: usize) -> HistoricalSeries {
        let tail = |points: Vec<[f64; 2]>| -> Vec<f64> {
            let skip = points.len().saturating_sub(days);
            points.into_iter().skip(skip).map(|[_, value]| value).collect()
        };

        HistoricalSeries::new(tail(self.prices), tail(self.total_volumes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn build_client(server: &MockServer) -> CoinGeckoClient {
        CoinGeckoClient::new(server.base_url(), Duration::from_secs(10)).unwrap()
    }

    fn chart_points(n: usize, start: f64) -> Vec<serde_json::Value> {
        (0..n)
            .map(|i| json!([1_700_000_000_000i64 + i as i64 * 86_400_000, start + i as f64]))
            .collect()
    }

    #[tokio::test]
    async fn fetch_history_keeps_most_recent_days() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/coins/bitcoin/market_chart")
                    .query_param("vs_currency", "usd")
                    .query_param("days", "30")
                    .query_param("interval", "daily");
                then.status(200).json_body(json!({
                    "prices": chart_points(31, 100.0),
                    "market_caps": [],
                    "total_volumes": chart_points(31, 5000.0),
                }));
            })
            .await;

        let series = build_client(&server).fetch_history("bitcoin", 30).await;

        mock.assert_async().await;
        assert_eq!(series.len(), 30);
        assert_eq!(series.volumes.len(), 30);
        assert!((series.prices[0] - 101.0).abs() < f64::EPSILON);
        assert!((series.prices[29] - 130.0).abs() < f64::EPSILON);
        assert!((series.volumes[29] - 5030.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn fetch_history_is_empty_on_error_status_without_retry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/coins/bitcoin/market_chart");
                then.status(429).body("rate limited");
            })
            .await;

        let series = build_client(&server).fetch_history("bitcoin", 30).await;

        mock.assert_hits_async(1).await;
        assert!(series.is_empty());
        assert!(series.volumes.is_empty());
    }

    #[tokio::test]
    async fn fetch_history_is_empty_on_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/coins/solana/market_chart");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let series = build_client(&server).fetch_history("solana", 30).await;
        assert!(series.is_empty());
    }
}
