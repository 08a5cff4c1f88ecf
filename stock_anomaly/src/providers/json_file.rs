//! Reads daily bars from a local JSON file.
//!
//! Accepted shapes:
//!
//! ```json
//! [{"date": "2024-01-02", "close": 185.64, "open": 187.15, "volume": 82488674}]
//! ```
//!
//! or wrapped, optionally naming the symbol the file holds:
//!
//! ```json
//! {"symbol": "AAPL", "bars": [{"date": "2024-01-02T05:00:00Z", "close": 185.64}]}
//! ```
//!
//! Only the first ten characters of `date` are read, so both plain dates and
//! RFC 3339 timestamps work.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::PriceRequest,
    },
    providers::{DataProvider, DecodeSnafu, ProviderError, ReadFileSnafu, UnknownSymbolSnafu},
};

fn deserialize_naive_date<'de, D>(d: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    NaiveDate::parse_from_str(s.get(..10).unwrap_or(&s), "%Y-%m-%d")
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct JsonBar {
    #[serde(alias = "timestamp", alias = "t", deserialize_with = "deserialize_naive_date")]
    date: NaiveDate,
    #[serde(alias = "c")]
    close: f64,
    #[serde(default, alias = "o")]
    open: Option<f64>,
    #[serde(default, alias = "h")]
    high: Option<f64>,
    #[serde(default, alias = "l")]
    low: Option<f64>,
    #[serde(default, alias = "v")]
    volume: Option<f64>,
}

impl From<JsonBar> for Bar {
    fn from(jb: JsonBar) -> Self {
        Bar {
            timestamp: jb.date.and_time(NaiveTime::MIN).and_utc(),
            open: jb.open,
            high: jb.high,
            low: jb.low,
            close: jb.close,
            volume: jb.volume,
            trade_count: None,
            vwap: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonBars {
    List(Vec<JsonBar>),
    Wrapped {
        #[serde(default)]
        symbol: Option<String>,
        bars: Vec<JsonBar>,
    },
}

pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataProvider for JsonFileProvider {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .context(ReadFileSnafu { path: self.path.clone() })?;

        let bars = match serde_json::from_str::<JsonBars>(&text).context(DecodeSnafu)? {
            JsonBars::List(bars) => bars,
            JsonBars::Wrapped { symbol, bars } => {
                if let Some(symbol) = symbol {
                    if !symbol.trim().eq_ignore_ascii_case(&request.ticker) {
                        return UnknownSymbolSnafu {
                            symbol: request.ticker.clone(),
                        }
                        .fail();
                    }
                }
                bars
            }
        };

        let (start, end) = request.range.resolve(Utc::now().date_naive());
        let total = bars.len();
        let bars: Vec<Bar> = bars
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .map(Bar::from)
            .collect();
        debug!(path = %self.path.display(), total, kept = bars.len(), "loaded bars from file");

        Ok(BarSeries {
            symbol: request.ticker.clone(),
            bars,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::models::request_params::{DateRange, TrailingPeriod};

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    fn between(ticker: &str, start: &str, end: &str) -> PriceRequest {
        PriceRequest::new(
            ticker,
            DateRange::Between {
                start: start.parse().unwrap(),
                end: Some(end.parse().unwrap()),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reads_plain_list_and_filters_range() {
        let file = file_with(
            r#"[
                {"date": "2024-01-02", "close": 10.0},
                {"date": "2024-01-03T05:00:00Z", "close": 11.0, "open": 10.5, "volume": 1000},
                {"date": "2024-02-01", "close": 12.0}
            ]"#,
        );
        let provider = JsonFileProvider::new(file.path());

        let series = provider
            .fetch_daily(&between("aapl", "2024-01-01", "2024-01-31"))
            .await
            .unwrap();

        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.bars.len(), 2);
        assert_eq!(series.bars[1].close, 11.0);
        assert_eq!(series.bars[1].open, Some(10.5));
        assert_eq!(series.bars[1].timestamp.date_naive().to_string(), "2024-01-03");
    }

    #[tokio::test]
    async fn wrapped_file_for_other_symbol_is_unknown() {
        let file = file_with(r#"{"symbol": "MSFT", "bars": [{"t": "2024-01-02", "c": 1.0}]}"#);
        let provider = JsonFileProvider::new(file.path());

        let err = provider
            .fetch_daily(&between("AAPL", "2024-01-01", "2024-01-31"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownSymbol { .. }));
    }

    #[tokio::test]
    async fn missing_file_and_bad_json_are_distinct_errors() {
        let request = PriceRequest::new("AAPL", DateRange::Trailing(TrailingPeriod::Max)).unwrap();

        let missing = JsonFileProvider::new("/no/such/bars.json");
        assert!(matches!(
            missing.fetch_daily(&request).await,
            Err(ProviderError::ReadFile { .. })
        ));

        let file = file_with(r#"{"rows": []}"#);
        let garbled = JsonFileProvider::new(file.path());
        assert!(matches!(
            garbled.fetch_daily(&request).await,
            Err(ProviderError::Decode { .. })
        ));
    }
}
