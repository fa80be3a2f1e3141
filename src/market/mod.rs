pub mod yahoo;

use crate::error::DashboardResult;
use crate::models::{PriceData, PriceSeries, TimeWindow};
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub use self::yahoo::YahooProvider;

// ── Provider trait ────────────────────────────────────────────────────────────

/// Swappable market data provider.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Daily closes for one ticker. `Ok(None)` means the provider has no
    /// data for it.
    async fn fetch_one(&self, ticker: &str, window: TimeWindow)
    -> DashboardResult<Option<PriceSeries>>;
}

// ── Batch fetch ───────────────────────────────────────────────────────────────

/// Fetch series for every distinct ticker, at most `concurrency` requests in
/// flight. Returns only once all requests are done. Tickers with no data or
/// a failed request are left out of the map.
pub async fn fetch_series<P>(
    provider: Arc<P>,
    tickers: &[String],
    window: TimeWindow,
    concurrency: usize,
) -> PriceData
where
    P: PriceProvider + ?Sized + 'static,
{
    let mut distinct: Vec<String> = Vec::with_capacity(tickers.len());
    for t in tickers {
        if !distinct.contains(t) {
            distinct.push(t.clone());
        }
    }

    let (start, end) = window.bounds(Local::now().date_naive());
    info!(
        "Fetching {} → {} prices for {} tickers from {}",
        start,
        end,
        distinct.len(),
        provider.name()
    );

    let sem = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(distinct.len());

    for ticker in distinct {
        let provider = Arc::clone(&provider);
        let sem = Arc::clone(&sem);
        let t = ticker.clone();

        let handle = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok();
            provider.fetch_one(&t, window).await
        });
        handles.push((ticker, handle));
    }

    let mut data = PriceData::new();
    for (ticker, handle) in handles {
        match handle.await {
            Ok(Ok(Some(series))) => {
                debug!("{}: {} closes", ticker, series.points.len());
                data.insert(ticker, series);
            }
            Ok(Ok(None)) => warn!("{}: no price data", ticker),
            Ok(Err(e)) => warn!("{}: {}", ticker, e),
            Err(e) => error!("Task panic for {}: {}", ticker, e),
        }
    }

    info!("Price data for {} tickers", data.len());
    data
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::models::PricePoint;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn series(ticker: &str, closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: NaiveDate::from_ymd_opt(2026, 1, 1 + i as u32).unwrap(),
                close,
            })
            .collect();
        PriceSeries::new(ticker, points)
    }

    /// In-memory provider; unknown tickers have no data, "FAIL" tickers error.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub series: HashMap<String, PriceSeries>,
        pub calls: AtomicUsize,
    }

    impl FakeProvider {
        pub(crate) fn with(tickers: &[&str]) -> Self {
            Self {
                series: tickers
                    .iter()
                    .map(|t| (t.to_string(), series(t, &[100.0, 101.5, 99.0])))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_one(
            &self,
            ticker: &str,
            _window: TimeWindow,
        ) -> DashboardResult<Option<PriceSeries>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ticker.starts_with("FAIL") {
                return Err(DashboardError::SourceUnavailable("boom".into()));
            }
            Ok(self.series.get(ticker).cloned())
        }
    }

    fn owned(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_missing_and_failed_tickers_are_absent() {
        let provider = Arc::new(FakeProvider::with(&["A.NS", "C.NS"]));
        let data = fetch_series(
            provider,
            &owned(&["A.NS", "B.NS", "C.NS", "FAIL.NS"]),
            TimeWindow::YearToDate,
            2,
        )
        .await;

        assert_eq!(data.len(), 2);
        assert!(data.contains_key("A.NS"));
        assert!(!data.contains_key("B.NS"));
        assert!(!data.contains_key("FAIL.NS"));
    }

    #[tokio::test]
    async fn test_duplicate_tickers_fetched_once() {
        let provider = Arc::new(FakeProvider::with(&["A.NS"]));
        let data = fetch_series(
            Arc::clone(&provider),
            &owned(&["A.NS", "A.NS", "A.NS"]),
            TimeWindow::YearToDate,
            0,
        )
        .await;

        assert_eq!(data.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
