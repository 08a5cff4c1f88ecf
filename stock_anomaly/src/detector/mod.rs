//! Rolling z-score anomaly detection over a daily closing-price series.
//!
//! For every observation the detector looks at the trailing window of
//! `window` closes (current one included, nothing from the future), computes
//! the mean and sample standard deviation, and derives the z-score of the
//! current close. Observations with `|z| > threshold` are anomalies.
//!
//! Two situations leave statistics undefined without failing the run:
//! - the first `window - 1` observations, which have no full window yet;
//! - windows with zero spread, where the z-score does not exist.
//!
//! In both cases `is_anomaly` is `false`. A series shorter than the window is
//! therefore a valid, all-undefined result (see [`Detection::has_full_window`]).

pub mod params;
pub mod rolling;

pub use params::DetectorParams;

use serde::Serialize;
use thiserror::Error;

use crate::models::price::{PriceObservation, PriceSeries};

/// Input problems that abort a detection run before any computation.
#[derive(Debug, Error, PartialEq)]
pub enum DetectError {
    #[error("cannot detect anomalies in an empty price series")]
    EmptySeries,

    #[error("window must be at least 2 observations, got {window}")]
    WindowTooSmall { window: usize },

    #[error("threshold must be a finite, non-negative number, got {threshold}")]
    InvalidThreshold { threshold: f64 },
}

/// A price observation with its rolling statistics attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedObservation {
    #[serde(flatten)]
    pub observation: PriceObservation,
    pub moving_average: Option<f64>,
    pub std_dev: Option<f64>,
    pub z_score: Option<f64>,
    pub is_anomaly: bool,
}

/// Output of [`detect`]: the full annotated series and the flagged subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub window: usize,
    pub threshold: f64,
    /// Same length and order as the input series.
    pub annotated: Vec<AnnotatedObservation>,
    /// Order-preserving subsequence of `annotated` where `is_anomaly` holds.
    pub anomalies: Vec<AnnotatedObservation>,
}

impl Detection {
    /// `false` when the series was shorter than the window, so no statistic
    /// could be computed for any observation.
    pub fn has_full_window(&self) -> bool {
        self.annotated.len() >= self.window
    }
}

/// Annotates `series` with rolling statistics and collects the anomalies.
///
/// Errors:
/// - [`DetectError::EmptySeries`] if the series has no observations
/// - [`DetectError::WindowTooSmall`] / [`DetectError::InvalidThreshold`] for bad parameters
pub fn detect(series: &PriceSeries, params: DetectorParams) -> Result<Detection, DetectError> {
    params.validate()?;
    if series.is_empty() {
        return Err(DetectError::EmptySeries);
    }

    let closes = series.closes();
    let stats = rolling::rolling_stats(&closes, params.window);

    let annotated: Vec<AnnotatedObservation> = series
        .observations()
        .iter()
        .zip(stats)
        .map(|(obs, stats)| {
            let z_score = stats.and_then(|s| s.z_score(obs.close));
            AnnotatedObservation {
                observation: obs.clone(),
                moving_average: stats.map(|s| s.mean),
                std_dev: stats.map(|s| s.std_dev),
                z_score,
                is_anomaly: z_score.is_some_and(|z| z.abs() > params.threshold),
            }
        })
        .collect();

    let anomalies = annotated.iter().filter(|a| a.is_anomaly).cloned().collect();

    Ok(Detection {
        window: params.window,
        threshold: params.threshold,
        annotated,
        anomalies,
    })
}
