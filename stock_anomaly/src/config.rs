//! Application configuration loaded from an optional TOML file.
//!
//! Every section and field is optional; missing values fall back to defaults
//! and command-line flags override whatever the file says. Unknown keys are
//! rejected so typos do not silently fall back to defaults.
//!
//! ```toml
//! [detector]
//! window = 20
//! threshold = 3.0
//!
//! [provider]
//! kind = "alpaca"
//! feed = "iex"
//! adjustment = "split"
//!
//! [cache]
//! ttl_secs = 3600
//!
//! [logging]
//! filter = "stock_anomaly=info,warn"
//! ```

use std::{path::{Path, PathBuf}, time::Duration};

use serde::{Deserialize, Serialize};
use shared_utils::config::{ConfigError, load_toml};

use crate::{
    detector::DetectorParams,
    providers::alpaca_rest::params::{Adjustment, Feed},
};

pub const ALPACA_BARS_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub detector: DetectorParams,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads the config file at `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => load_toml(path),
            None => Ok(Self::default()),
        }
    }
}

/// Which market data source to read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Alpaca,
    Json,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Alpaca data feed. `iex` works on the free plan.
    pub feed: Feed,
    /// Corporate action adjustment applied to Alpaca bars.
    pub adjustment: Adjustment,
    pub base_url: String,
    /// Bars file read when `kind = "json"`.
    pub json_path: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            feed: Feed::default(),
            adjustment: Adjustment::default(),
            base_url: ALPACA_BARS_URL.to_string(),
            json_path: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// How long fetched series stay valid; `0` disables caching.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "stock_anomaly=info,warn".to_string(),
        }
    }
}
