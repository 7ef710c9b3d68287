//! Background price refresh

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cache::PriceCache;

/// Repeating job that refreshes the price cache on a fixed interval.
///
/// The first refresh runs immediately. Dropping the handle does not stop
/// the job; cancel its token.
pub struct RefreshJob {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshJob {
    pub fn spawn(cache: Arc<PriceCache>, every: Duration, cancel: CancellationToken) -> Self {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        refresh_once(&cache, Utc::now()).await;
                    }
                }
            }

            tracing::info!("Price refresh job stopped");
        });

        Self { cancel, handle }
    }

    /// Cancel and wait for the job to finish its current cycle
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            tracing::error!(error = %err, "Price refresh job panicked");
        }
    }
}

/// Result of one scheduled refresh
#[derive(Debug, PartialEq, Eq)]
enum RefreshOutcome {
    Updated,
    Stale,
    Empty,
}

async fn refresh_once(cache: &PriceCache, now: DateTime<Utc>) -> RefreshOutcome {
    match cache.refresh_at(now).await {
        Some(snapshot) if snapshot.fetched_at == now => {
            tracing::info!(coins = snapshot.len(), "Scheduled price refresh done");
            RefreshOutcome::Updated
        }
        Some(snapshot) => {
            tracing::warn!(
                coins = snapshot.len(),
                fetched_at = %snapshot.fetched_at,
                "Scheduled price refresh failed, stale prices kept"
            );
            RefreshOutcome::Stale
        }
        None => {
            tracing::error!("Scheduled price refresh produced no prices");
            RefreshOutcome::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{MockPriceSource, PriceSource};

    #[tokio::test(start_paused = true)]
    async fn refreshes_immediately_and_on_every_tick() {
        let source = Arc::new(MockPriceSource::new());
        let cache = Arc::new(PriceCache::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            Duration::from_secs(300),
        ));

        let job = RefreshJob::spawn(Arc::clone(&cache), Duration::from_secs(300), CancellationToken::new());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 6);
        assert!(cache.current().await.is_some());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.calls(), 12);

        job.shutdown().await;
        tokio::time::sleep(Duration::from_secs(900)).await;
        assert_eq!(source.calls(), 12);
    }

    #[tokio::test]
    async fn failed_refresh_reports_stale_fallback() {
        let source = Arc::new(MockPriceSource::new());
        let cache = PriceCache::new(Arc::clone(&source) as Arc<dyn PriceSource>, Duration::from_secs(300));
        let start = Utc::now();

        assert_eq!(refresh_once(&cache, start).await, RefreshOutcome::Updated);

        source.fail_all();
        let later = start + chrono::Duration::seconds(400);
        assert_eq!(refresh_once(&cache, later).await, RefreshOutcome::Stale);
        assert_eq!(cache.current().await.unwrap().fetched_at, start);

        let too_late = start + chrono::Duration::seconds(700);
        assert_eq!(refresh_once(&cache, too_late).await, RefreshOutcome::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn external_cancel_stops_job() {
        let source = Arc::new(MockPriceSource::new());
        let cache = Arc::new(PriceCache::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            Duration::from_secs(300),
        ));
        let token = CancellationToken::new();

        let job = RefreshJob::spawn(cache, Duration::from_secs(60), token.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;

        token.cancel();
        job.shutdown().await;
        let calls = source.calls();

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.calls(), calls);
    }
}
