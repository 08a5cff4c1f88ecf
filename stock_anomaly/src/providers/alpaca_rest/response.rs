use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::bar::Bar;

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
    #[serde(rename = "n")]
    pub trade_count: Option<u64>,
    #[serde(rename = "vw")]
    pub vwap: Option<f64>,
}

impl From<AlpacaBar> for Bar {
    fn from(ab: AlpacaBar) -> Self {
        Bar {
            timestamp: ab.timestamp,
            open: Some(ab.open),
            high: Some(ab.high),
            low: Some(ab.low),
            close: ab.close,
            volume: Some(ab.volume),
            trade_count: ab.trade_count,
            vwap: ab.vwap,
        }
    }
}

/// One page of the multi-symbol bars endpoint. `bars` is `null` when the
/// range holds no data.
#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

/// Error body Alpaca sends with non-2xx responses.
#[derive(Deserialize, Debug)]
pub struct AlpacaErrorBody {
    pub message: String,
}
