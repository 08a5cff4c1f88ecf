//! Plain-text rendering of a [`DetectionReport`] for terminals.

use std::fmt::Write;

use crate::{detector::AnnotatedObservation, models::report::DetectionReport};

pub const NO_ANOMALIES: &str = "No anomalies found in this period.";

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Title line plus a one-line description of the series span.
pub fn render_summary(report: &DetectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Price series for {}", report.ticker);
    match (report.first_date, report.last_date) {
        (Some(first), Some(last)) => {
            let _ = writeln!(
                out,
                "{} observations from {first} to {last} (window {}, threshold {})",
                report.annotated().len(),
                report.detection.window,
                report.detection.threshold,
            );
        }
        _ => {
            let _ = writeln!(out, "no observations");
        }
    }
    out
}

/// Every observation with its rolling statistics; anomalies are marked `*`.
pub fn render_series(report: &DetectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<10}  {:>12}  {:>12}  {:>10}  {:>8}",
        "date", "close", "moving avg", "std dev", "z-score"
    );
    for row in report.annotated() {
        let _ = writeln!(
            out,
            "{} {:<10}  {:>12.2}  {:>12}  {:>10}  {:>8}",
            if row.is_anomaly { '*' } else { ' ' },
            row.observation.timestamp,
            row.observation.close,
            fmt_opt(row.moving_average),
            fmt_opt(row.std_dev),
            fmt_opt(row.z_score),
        );
    }
    out
}

fn anomaly_row(out: &mut String, row: &AnnotatedObservation) {
    let _ = writeln!(
        out,
        "{:<10}  {:>12.2}  {:>8}",
        row.observation.timestamp,
        row.observation.close,
        fmt_opt(row.z_score),
    );
}

/// The detected-anomalies listing, or an explicit message when there is
/// nothing to list.
pub fn render_anomaly_table(report: &DetectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Detected anomalies (unusual events)");

    if !report.detection.has_full_window() {
        let _ = writeln!(
            out,
            "Series has {} observations, fewer than the {}-day window; no statistics computed.",
            report.annotated().len(),
            report.detection.window,
        );
        return out;
    }
    if report.anomalies().is_empty() {
        let _ = writeln!(out, "{NO_ANOMALIES}");
        return out;
    }

    let _ = writeln!(out, "{:<10}  {:>12}  {:>8}", "date", "close", "z-score");
    for row in report.anomalies() {
        anomaly_row(&mut out, row);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::{
        detector::{DetectorParams, detect},
        models::price::PriceSeries,
    };

    fn report(closes: &[f64]) -> DetectionReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_closes(
            "AAPL",
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| (start + Days::new(i as u64), *c)),
        )
        .unwrap();
        let detection = detect(&series, DetectorParams::default()).unwrap();
        DetectionReport::new(&series, detection)
    }

    #[test]
    fn quiet_series_says_so() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        let text = render_anomaly_table(&report(&closes));
        assert!(text.contains(NO_ANOMALIES));
    }

    #[test]
    fn short_series_explains_missing_statistics() {
        let text = render_anomaly_table(&report(&[1.0, 2.0, 3.0]));
        assert!(text.contains("fewer than the 20-day window"));
        assert!(!text.contains(NO_ANOMALIES));
    }

    #[test]
    fn anomalies_are_listed_with_date_close_and_z() {
        let mut closes = vec![100.0; 25];
        closes.push(1000.0);
        let text = render_anomaly_table(&report(&closes));

        let row = text.lines().last().unwrap();
        assert!(row.starts_with("2024-01-26"));
        assert!(row.contains("1000.00"));
        assert!(row.contains("4.25"));
    }

    #[test]
    fn series_marks_anomalies_and_blanks_undefined_stats() {
        let mut closes = vec![100.0; 25];
        closes.push(1000.0);
        let text = render_series(&report(&closes));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 27);
        assert!(lines[1].starts_with("  2024-01-01"));
        assert!(lines[1].trim_end().ends_with('-'));
        assert!(lines[26].starts_with("* 2024-01-26"));
    }

    #[test]
    fn summary_names_span() {
        let text = render_summary(&report(&[5.0; 3]));
        assert!(text.starts_with("Price series for AAPL"));
        assert!(text.contains("3 observations from 2024-01-01 to 2024-01-03"));
    }
}
