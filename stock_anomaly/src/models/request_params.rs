use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`PriceRequest`].
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("ticker symbol cannot be empty")]
    EmptyTicker,

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("unknown trailing period '{0}' (expected one of 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, ytd, max)")]
    UnknownPeriod(String),
}

/// Parses a `YYYY-MM-DD` date. Anything after the first ten characters is
/// ignored, so RFC 3339 timestamps are accepted too.
pub fn parse_date(s: &str) -> Result<NaiveDate, RequestError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d")
        .map_err(|_| RequestError::InvalidDate(s.to_string()))
}

/// Trailing lookback windows, named the way retail charting tools name them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailingPeriod {
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    YearToDate,
    Max,
}

impl TrailingPeriod {
    /// First calendar date covered by this period when it ends on `today`.
    pub fn start_from(self, today: NaiveDate) -> NaiveDate {
        let months_back = |n: u32| {
            today
                .checked_sub_months(Months::new(n))
                .unwrap_or(NaiveDate::MIN)
        };
        match self {
            TrailingPeriod::FiveDays => today
                .checked_sub_days(Days::new(5))
                .unwrap_or(NaiveDate::MIN),
            TrailingPeriod::OneMonth => months_back(1),
            TrailingPeriod::ThreeMonths => months_back(3),
            TrailingPeriod::SixMonths => months_back(6),
            TrailingPeriod::OneYear => months_back(12),
            TrailingPeriod::TwoYears => months_back(24),
            TrailingPeriod::FiveYears => months_back(60),
            TrailingPeriod::YearToDate => {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
            }
            TrailingPeriod::Max => earliest_date(),
        }
    }
}

/// Lower bound used for `max`; no US equity feed has daily bars before this.
fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl fmt::Display for TrailingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrailingPeriod::FiveDays => "5d",
            TrailingPeriod::OneMonth => "1mo",
            TrailingPeriod::ThreeMonths => "3mo",
            TrailingPeriod::SixMonths => "6mo",
            TrailingPeriod::OneYear => "1y",
            TrailingPeriod::TwoYears => "2y",
            TrailingPeriod::FiveYears => "5y",
            TrailingPeriod::YearToDate => "ytd",
            TrailingPeriod::Max => "max",
        };
        f.write_str(s)
    }
}

impl FromStr for TrailingPeriod {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5d" => Ok(TrailingPeriod::FiveDays),
            "1mo" => Ok(TrailingPeriod::OneMonth),
            "3mo" => Ok(TrailingPeriod::ThreeMonths),
            "6mo" => Ok(TrailingPeriod::SixMonths),
            "1y" => Ok(TrailingPeriod::OneYear),
            "2y" => Ok(TrailingPeriod::TwoYears),
            "5y" => Ok(TrailingPeriod::FiveYears),
            "ytd" => Ok(TrailingPeriod::YearToDate),
            "max" => Ok(TrailingPeriod::Max),
            _ => Err(RequestError::UnknownPeriod(s.to_string())),
        }
    }
}

/// The calendar span a request covers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRange {
    /// Explicit start date (inclusive) and optional end date (inclusive).
    /// A missing end means "through today".
    Between {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    /// A lookback period ending today.
    Trailing(TrailingPeriod),
}

impl DateRange {
    /// Resolves the range to inclusive `(start, end)` dates relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            DateRange::Between { start, end } => (*start, end.unwrap_or(today)),
            DateRange::Trailing(period) => (period.start_from(today), today),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::Between { start, end: Some(end) } => write!(f, "{start}..={end}"),
            DateRange::Between { start, end: None } => write!(f, "{start}..today"),
            DateRange::Trailing(period) => write!(f, "last {period}"),
        }
    }
}

/// Parameters for requesting daily bars for a single ticker from any provider.
///
/// Doubles as the cache key for [`CachedProvider`](crate::providers::cache::CachedProvider).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRequest {
    /// Upper-cased, trimmed ticker symbol (e.g. `"AAPL"`).
    pub ticker: String,
    pub range: DateRange,
}

impl PriceRequest {
    pub fn new(ticker: &str, range: DateRange) -> Result<Self, RequestError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(RequestError::EmptyTicker);
        }
        if let DateRange::Between {
            start,
            end: Some(end),
        } = &range
        {
            if start > end {
                return Err(RequestError::InvertedRange {
                    start: *start,
                    end: *end,
                });
            }
        }
        Ok(Self { ticker, range })
    }
}
