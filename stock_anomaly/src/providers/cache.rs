//! Read-mostly TTL cache in front of any [`DataProvider`].
//!
//! Readers load an `Arc<HashMap<..>>` snapshot with no locking. A successful
//! fetch swaps in a new snapshot with the fresh entry added and expired
//! entries dropped.
//!
//! Implementation notes:
//! - Uses `arc-swap` for atomic pointer swaps + cheap reads (no RwLock).
//! - Keys are whole [`PriceRequest`]s, i.e. `(ticker, range)`. A trailing
//!   range like "1y" is cached as-is, so it can lag by at most one TTL.
//! - Errors are never cached; the next call retries the inner provider.
//! - Two concurrent misses for the same key both go to the inner provider.
//!   The last writer wins, which is harmless for identical data.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::PriceRequest},
    providers::{DataProvider, ProviderError},
};

#[derive(Clone)]
struct CacheEntry {
    fetched_at: Instant,
    series: Arc<BarSeries>,
}

type Snapshot = HashMap<PriceRequest, CacheEntry>;

pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: ArcSwap<Snapshot>,
}

impl<P: DataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries.store(Arc::new(Snapshot::new()));
    }

    fn lookup(&self, request: &PriceRequest) -> Option<Arc<BarSeries>> {
        let snap = self.entries.load();
        snap.get(request)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.series))
    }

    fn store(&self, request: &PriceRequest, series: Arc<BarSeries>) {
        let entry = CacheEntry {
            fetched_at: Instant::now(),
            series,
        };
        let ttl = self.ttl;
        self.entries.rcu(|current| {
            let mut next: Snapshot = current
                .iter()
                .filter(|(_, e)| e.fetched_at.elapsed() < ttl)
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect();
            next.insert(request.clone(), entry.clone());
            next
        });
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for CachedProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
        if let Some(series) = self.lookup(request) {
            debug!(ticker = %request.ticker, range = %request.range, "cache hit");
            return Ok(series.as_ref().clone());
        }

        debug!(ticker = %request.ticker, range = %request.range, "cache miss");
        let series = self.inner.fetch_daily(request).await?;
        self.store(request, Arc::new(series.clone()));
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        models::{
            bar::Bar,
            request_params::{DateRange, TrailingPeriod},
        },
        providers::ApiSnafu,
    };

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl DataProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return ApiSnafu {
                    status: 503u16,
                    message: "unavailable",
                }
                .fail();
            }
            let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
            Ok(BarSeries {
                symbol: request.ticker.clone(),
                bars: vec![Bar::close_only(ts, 100.0 + n as f64)],
            })
        }
    }

    fn request(ticker: &str, period: TrailingPeriod) -> PriceRequest {
        PriceRequest::new(ticker, DateRange::Trailing(period)).unwrap()
    }

    #[tokio::test]
    async fn repeated_request_hits_cache() {
        let cached = CachedProvider::new(CountingProvider::default(), Duration::from_secs(3600));
        let req = request("AAPL", TrailingPeriod::OneYear);

        let first = cached.fetch_daily(&req).await.unwrap();
        let second = cached.fetch_daily(&req).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn key_includes_range() {
        let cached = CachedProvider::new(CountingProvider::default(), Duration::from_secs(3600));

        cached.fetch_daily(&request("AAPL", TrailingPeriod::OneYear)).await.unwrap();
        cached.fetch_daily(&request("AAPL", TrailingPeriod::SixMonths)).await.unwrap();
        cached.fetch_daily(&request("MSFT", TrailingPeriod::OneYear)).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cached.len(), 3);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let cached = CachedProvider::new(CountingProvider::default(), Duration::ZERO);
        let req = request("AAPL", TrailingPeriod::OneYear);

        let first = cached.fetch_daily(&req).await.unwrap();
        let second = cached.fetch_daily(&req).await.unwrap();

        assert_ne!(first.bars[0].close, second.bars[0].close);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = CachedProvider::new(
            CountingProvider {
                fail: true,
                ..Default::default()
            },
            Duration::from_secs(3600),
        );
        let req = request("AAPL", TrailingPeriod::OneYear);

        assert!(cached.fetch_daily(&req).await.is_err());
        assert!(cached.fetch_daily(&req).await.is_err());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let cached = CachedProvider::new(CountingProvider::default(), Duration::from_secs(3600));
        let req = request("AAPL", TrailingPeriod::OneYear);

        cached.fetch_daily(&req).await.unwrap();
        cached.clear();
        cached.fetch_daily(&req).await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
