//! Fixed History Source
//!
//! Serves pre-loaded series. Used by tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::HistorySource;
use crate::model::HistoricalSeries;

/// History source backed by an in-memory table keyed by external id
#[derive(Default)]
pub struct FixedHistorySource {
    series: HashMap<String, HistoricalSeries>,
    requests: AtomicUsize,
}

impl FixedHistorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, external_id: impl Into<String>, series: HistoricalSeries) -> Self {
        self.series.insert(external_id.into(), series);
        self
    }

    /// Number of history requests served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for FixedHistorySource {
    async fn fetch_history(&self, external_id: &str, days: u32) -> HistoricalSeries {
        self.requests.fetch_add(1, Ordering::SeqCst);

        self.series
            .get(external_id)
            .map(|series| series.most_recent(days as usize))
            .unwrap_or_default()
    }
}
