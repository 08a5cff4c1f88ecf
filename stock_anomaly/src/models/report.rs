//! Serializable result handed to the presentation layer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    detector::{AnnotatedObservation, Detection},
    models::price::PriceSeries,
};

/// Everything a chart or table needs: the annotated series for the line and
/// markers, and the anomaly subset for the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub ticker: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub detection: Detection,
}

impl DetectionReport {
    pub fn new(series: &PriceSeries, detection: Detection) -> Self {
        Self {
            ticker: series.ticker().to_string(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            detection,
        }
    }

    pub fn annotated(&self) -> &[AnnotatedObservation] {
        &self.detection.annotated
    }

    pub fn anomalies(&self) -> &[AnnotatedObservation] {
        &self.detection.anomalies
    }
}
