//! Turns raw provider output into a validated [`PriceSeries`].
//!
//! "No series available" and "provider failed" are separate terminal states
//! here, and both are distinct from "series available but shorter than one
//! window", which is left to the detector.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{
        bar::Bar,
        price::{PriceObservation, PriceSeries, SeriesError},
        request_params::PriceRequest,
    },
    providers::{DataProvider, ProviderError},
};

#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered, but had no bars for the ticker and range.
    #[error("no data returned for {ticker} in the requested range")]
    NoData { ticker: String },

    /// The provider could not be reached or rejected the request.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The bars could not be turned into a usable closing-price series.
    #[error("provider returned an unusable series: {0}")]
    InvalidSeries(#[from] SeriesError),
}

/// Fetches daily bars for `request` and normalizes them into a [`PriceSeries`].
pub async fn fetch_series(
    provider: &dyn DataProvider,
    request: &PriceRequest,
) -> Result<PriceSeries, FetchError> {
    info!(
        provider = provider.name(),
        ticker = %request.ticker,
        range = %request.range,
        "fetching price series"
    );
    let bar_series = provider.fetch_daily(request).await?;
    let series = normalize(&request.ticker, bar_series.bars)?;
    info!(
        ticker = %request.ticker,
        observations = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "price series ready"
    );
    Ok(series)
}

/// Sorts bars by date, keeps the last bar seen for any repeated date, and
/// validates the result.
///
/// Errors:
/// - [`FetchError::NoData`] when `bars` is empty
/// - [`FetchError::InvalidSeries`] for non-finite or non-positive closes
pub fn normalize(ticker: &str, bars: Vec<Bar>) -> Result<PriceSeries, FetchError> {
    if bars.is_empty() {
        return Err(FetchError::NoData {
            ticker: ticker.to_string(),
        });
    }

    let total = bars.len();
    let mut by_date: BTreeMap<NaiveDate, PriceObservation> = BTreeMap::new();
    for bar in bars {
        let date = bar.timestamp.date_naive();
        by_date.insert(
            date,
            PriceObservation {
                timestamp: date,
                close: bar.close,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                volume: bar.volume,
            },
        );
    }

    let dropped = total - by_date.len();
    if dropped > 0 {
        warn!(ticker, dropped, "dropped bars with duplicate dates");
    }

    Ok(PriceSeries::new(ticker, by_date.into_values().collect())?)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use snafu::ResultExt;

    use super::*;
    use crate::{
        models::{
            bar::BarSeries,
            request_params::{DateRange, TrailingPeriod},
        },
        providers::ReqwestSnafu,
    };

    fn bar(day: u32, hour: u32, close: f64) -> Bar {
        Bar::close_only(Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(), close)
    }

    #[test]
    fn empty_bars_are_no_data() {
        let err = normalize("AAPL", vec![]).unwrap_err();
        assert!(matches!(err, FetchError::NoData { ref ticker } if ticker == "AAPL"));
        assert_eq!(
            err.to_string(),
            "no data returned for AAPL in the requested range"
        );
    }

    #[test]
    fn bars_are_sorted_and_deduplicated() {
        let series = normalize(
            "AAPL",
            vec![bar(4, 5, 12.0), bar(2, 5, 10.0), bar(3, 5, 11.0), bar(3, 16, 11.5)],
        )
        .unwrap();

        assert_eq!(series.closes(), vec![10.0, 11.5, 12.0]);
        assert_eq!(series.first_date().unwrap().to_string(), "2024-01-02");
    }

    #[test]
    fn bad_close_is_invalid_series() {
        let err = normalize("AAPL", vec![bar(2, 5, 10.0), bar(3, 5, -1.0)]).unwrap_err();
        assert!(matches!(
            err,
            FetchError::InvalidSeries(SeriesError::InvalidClose { .. })
        ));
    }

    struct StaticProvider(Vec<Bar>);
    struct BrokenProvider;

    #[async_trait]
    impl DataProvider for StaticProvider {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
            Ok(BarSeries {
                symbol: request.ticker.clone(),
                bars: self.0.clone(),
            })
        }
    }

    #[async_trait]
    impl DataProvider for BrokenProvider {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch_daily(&self, _request: &PriceRequest) -> Result<BarSeries, ProviderError> {
            // Any reqwest::Error will do; building a request with a bad URL yields one.
            let source = reqwest::Client::new().get("not a url").build().unwrap_err();
            Err(source).context(ReqwestSnafu)
        }
    }

    fn request() -> PriceRequest {
        PriceRequest::new("aapl", DateRange::Trailing(TrailingPeriod::OneMonth)).unwrap()
    }

    #[tokio::test]
    async fn fetch_series_normalizes_provider_output() {
        let provider = StaticProvider(vec![bar(3, 5, 11.0), bar(2, 5, 10.0)]);
        let series = fetch_series(&provider, &request()).await.unwrap();
        assert_eq!(series.ticker(), "AAPL");
        assert_eq!(series.closes(), vec![10.0, 11.0]);
    }

    #[tokio::test]
    async fn empty_provider_result_is_no_data_not_provider_error() {
        let provider = StaticProvider(vec![]);
        let err = fetch_series(&provider, &request()).await.unwrap_err();
        assert!(matches!(err, FetchError::NoData { .. }));
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced() {
        let err = fetch_series(&BrokenProvider, &request()).await.unwrap_err();
        assert!(matches!(err, FetchError::Provider(ProviderError::Reqwest { .. })));
    }
}
