//! Normalized daily closing-price series consumed by the detector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural problems found while assembling a [`PriceSeries`].
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    /// Dates must be strictly increasing (which also rules out duplicates).
    #[error("observations out of order: {next} does not follow {previous}")]
    NotIncreasing {
        previous: NaiveDate,
        next: NaiveDate,
    },

    /// Close prices must be finite and strictly positive.
    #[error("invalid close price {close} on {date}")]
    InvalidClose { date: NaiveDate, close: f64 },
}

/// One trading day's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Trading date.
    pub timestamp: NaiveDate,
    /// Closing price.
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PriceObservation {
    pub fn new(timestamp: NaiveDate, close: f64) -> Self {
        Self {
            timestamp,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// Daily observations for one ticker, ascending by date.
///
/// Construction enforces ordering and valid closes but allows an empty
/// series; the detector is responsible for rejecting that case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(
        ticker: impl Into<String>,
        observations: Vec<PriceObservation>,
    ) -> Result<Self, SeriesError> {
        for obs in &observations {
            if !obs.close.is_finite() || obs.close <= 0.0 {
                return Err(SeriesError::InvalidClose {
                    date: obs.timestamp,
                    close: obs.close,
                });
            }
        }
        for pair in observations.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0].timestamp,
                    next: pair[1].timestamp,
                });
            }
        }

        Ok(Self {
            ticker: ticker.into(),
            observations,
        })
    }

    /// Builds a series from `(date, close)` pairs.
    pub fn from_closes(
        ticker: impl Into<String>,
        closes: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        let observations = closes
            .into_iter()
            .map(|(date, close)| PriceObservation::new(date, close))
            .collect();
        Self::new(ticker, observations)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.timestamp)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn accepts_ascending_positive_series() {
        let series = PriceSeries::from_closes("AAPL", [(day(2), 10.0), (day(3), 11.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 11.0]);
        assert_eq!(series.first_date(), Some(day(2)));
        assert_eq!(series.last_date(), Some(day(3)));
    }

    #[test]
    fn empty_series_is_constructible() {
        let series = PriceSeries::new("AAPL", vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::from_closes("AAPL", [(day(2), 10.0), (day(2), 11.0)]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::NotIncreasing {
                previous: day(2),
                next: day(2)
            }
        );
    }

    #[test]
    fn rejects_non_positive_and_nan_close() {
        assert!(matches!(
            PriceSeries::from_closes("AAPL", [(day(2), 0.0)]),
            Err(SeriesError::InvalidClose { .. })
        ));
        assert!(matches!(
            PriceSeries::from_closes("AAPL", [(day(2), f64::NAN)]),
            Err(SeriesError::InvalidClose { .. })
        ));
    }
}
