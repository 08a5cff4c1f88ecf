use chrono::NaiveDate;

use crate::{
    cli::commands::OverrideArgs,
    config::{AppConfig, ProviderKind},
    models::request_params::{
        DateRange, PriceRequest, RequestError, TrailingPeriod, parse_date,
    },
};

/// Lookback used when neither a start date nor a period is given.
pub const DEFAULT_PERIOD: TrailingPeriod = TrailingPeriod::OneYear;

pub fn build_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    period: Option<TrailingPeriod>,
) -> DateRange {
    match (start, period) {
        (Some(start), _) => DateRange::Between { start, end },
        (None, Some(period)) => DateRange::Trailing(period),
        (None, None) => DateRange::Trailing(DEFAULT_PERIOD),
    }
}

/// Applies command-line overrides on top of the loaded config.
///
/// `--input` switches the provider to the JSON file reader.
pub fn apply_overrides(config: &mut AppConfig, overrides: &OverrideArgs) {
    if let Some(window) = overrides.window {
        config.detector.window = window;
    }
    if let Some(threshold) = overrides.threshold {
        config.detector.threshold = threshold;
    }
    if let Some(path) = &overrides.input {
        config.provider.kind = ProviderKind::Json;
        config.provider.json_path = Some(path.clone());
    }
    if let Some(ttl_secs) = overrides.cache_ttl {
        config.cache.ttl_secs = ttl_secs;
    }
}

/// Parses one interactive line: `TICKER [START|PERIOD] [END]`.
///
/// Blank lines and lines starting with `#` yield `Ok(None)`.
pub fn parse_query_line(line: &str) -> Result<Option<PriceRequest>, RequestError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let ticker = parts.next().unwrap_or_default();
    let range = match (parts.next(), parts.next()) {
        (None, _) => build_range(None, None, None),
        (Some(first), end) => match first.parse::<TrailingPeriod>() {
            Ok(period) if end.is_none() => DateRange::Trailing(period),
            _ => {
                let start = parse_date(first)?;
                let end = end.map(parse_date).transpose()?;
                DateRange::Between { start, end }
            }
        },
    };
    PriceRequest::new(ticker, range).map(Some)
}
