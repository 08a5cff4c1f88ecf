#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod detector;
pub mod errors;
pub mod feed;
pub mod io;
#[cfg(feature = "cli")]
pub mod logging;
pub mod models;
pub mod providers;

use tracing::info;

use crate::{
    detector::{DetectorParams, detect},
    errors::Error,
    feed::fetch_series,
    models::{report::DetectionReport, request_params::PriceRequest},
    providers::DataProvider,
};

/// Fetches the series for `request` and runs the detector over it.
///
/// Fails on provider errors, empty results, and invalid detector parameters.
/// A series shorter than the window is not an error; see
/// [`detector::Detection::has_full_window`].
pub async fn analyze(
    provider: &dyn DataProvider,
    request: &PriceRequest,
    params: DetectorParams,
) -> Result<DetectionReport, Error> {
    params.validate()?;
    let series = fetch_series(provider, request).await?;
    let detection = detect(&series, params)?;
    info!(
        ticker = %request.ticker,
        observations = detection.annotated.len(),
        anomalies = detection.anomalies.len(),
        "detection complete"
    );
    Ok(DetectionReport::new(&series, detection))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Days, NaiveDate, NaiveTime};

    use super::*;
    use crate::{
        detector::DetectError,
        feed::FetchError,
        models::{
            bar::{Bar, BarSeries},
            request_params::{DateRange, TrailingPeriod},
        },
        providers::ProviderError,
    };

    struct SpikeProvider(usize);

    #[async_trait]
    impl DataProvider for SpikeProvider {
        fn name(&self) -> &'static str {
            "spike"
        }

        async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            let bars = (0..self.0)
                .map(|i| {
                    let day = (start + Days::new(i as u64)).and_time(NaiveTime::MIN).and_utc();
                    Bar::close_only(day, if i == 25 { 1000.0 } else { 100.0 })
                })
                .collect();
            Ok(BarSeries {
                symbol: request.ticker.clone(),
                bars,
            })
        }
    }

    fn request() -> PriceRequest {
        PriceRequest::new("aapl", DateRange::Trailing(TrailingPeriod::OneYear)).unwrap()
    }

    #[tokio::test]
    async fn analyze_flags_the_spike() {
        let report = analyze(&SpikeProvider(31), &request(), DetectorParams::default())
            .await
            .unwrap();
        assert_eq!(report.ticker, "AAPL");
        assert_eq!(report.annotated().len(), 31);
        assert_eq!(report.anomalies().len(), 1);
        assert_eq!(report.anomalies()[0].observation.close, 1000.0);
    }

    #[tokio::test]
    async fn analyze_reports_no_data() {
        let err = analyze(&SpikeProvider(0), &request(), DetectorParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(FetchError::NoData { .. })));
    }

    #[tokio::test]
    async fn bad_params_fail_before_fetching() {
        let params = DetectorParams {
            window: 1,
            ..DetectorParams::default()
        };
        let err = analyze(&SpikeProvider(0), &request(), params).await.unwrap_err();
        assert!(matches!(err, Error::Detect(DetectError::WindowTooSmall { window: 1 })));
    }
}
