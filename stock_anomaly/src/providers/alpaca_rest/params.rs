use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Raw,
    #[default]
    Split,
    Dividend,
    All,
}

impl Adjustment {
    pub fn as_str(self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    #[default]
    Iex,
    Otc,
}

impl Feed {
    pub fn as_str(self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Alpaca caps a single page at 10 000 bars.
pub const MAX_PAGE_LIMIT: u32 = 10_000;

/// Alpaca-specific parameters for a daily bars request.
#[derive(Clone, Debug, PartialEq)]
pub struct AlpacaBarsParams {
    pub adjustment: Adjustment,
    pub feed: Feed,
    pub limit: u32,
}

impl Default for AlpacaBarsParams {
    fn default() -> Self {
        Self {
            adjustment: Adjustment::default(),
            feed: Feed::default(),
            limit: MAX_PAGE_LIMIT,
        }
    }
}

/// Builds the query string for one page of daily bars.
///
/// `start` and `end` are inclusive calendar dates. Alpaca treats `end` as an
/// instant, so the day after `end` is sent; when that lies beyond `today` the
/// parameter is omitted and Alpaca defaults to "now".
pub fn construct_params(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    options: &AlpacaBarsParams,
    page_token: Option<&str>,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), symbol.to_string()),
        ("timeframe".to_string(), "1Day".to_string()),
        ("start".to_string(), format!("{start}T00:00:00Z")),
        ("adjustment".to_string(), options.adjustment.as_str().to_string()),
        ("feed".to_string(), options.feed.as_str().to_string()),
        ("limit".to_string(), options.limit.min(MAX_PAGE_LIMIT).to_string()),
        ("sort".to_string(), "asc".to_string()),
    ];

    if let Some(exclusive_end) = end.checked_add_days(Days::new(1)) {
        if exclusive_end <= today {
            query.push(("end".to_string(), format!("{exclusive_end}T00:00:00Z")));
        }
    }
    if let Some(token) = page_token {
        query.push(("page_token".to_string(), token.to_string()));
    }
    query
}
