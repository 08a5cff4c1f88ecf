//! Provider abstraction for daily market data.
//!
//! This module defines the [`DataProvider`] trait, the single seam between the
//! detector pipeline and any market data vendor. Concrete implementations:
//!
//! - [`alpaca_rest::provider::AlpacaProvider`]: Alpaca Market Data v2 REST API
//! - [`json_file::JsonFileProvider`]: bars stored in a local JSON file
//! - [`cache::CachedProvider`]: TTL cache decorator over any provider
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`Box<dyn DataProvider>`) so the provider can be chosen from configuration
//! at runtime; see [`build_provider`].
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use stock_anomaly::models::{bar::BarSeries, request_params::PriceRequest};
//! use stock_anomaly::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     fn name(&self) -> &'static str {
//!         "mine"
//!     }
//!
//!     async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries { symbol: request.ticker.clone(), bars: vec![] })
//!     }
//! }
//! ```

pub mod alpaca_rest;
pub mod cache;
pub mod json_file;

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::{
    config::{ProviderConfig, ProviderKind},
    models::{bar::BarSeries, request_params::PriceRequest},
    providers::{
        alpaca_rest::provider::AlpacaProvider, cache::CachedProvider, json_file::JsonFileProvider,
    },
};

/// Trait for fetching daily bars for one ticker from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs (e.g. `"alpaca"`).
    fn name(&self) -> &'static str;

    /// Fetches daily bars for `request.ticker` covering `request.range`.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - The bars the provider has for the range. May be empty;
    ///   deciding what an empty result means is the caller's job.
    /// * `Err(ProviderError)` - Network failures, API rejections, unknown symbols.
    async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
        (**self).fetch_daily(request).await
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The JSON file provider was selected without a file to read.
    #[snafu(display("Provider kind 'json' requires a json_path"))]
    MissingJsonPath { backtrace: Backtrace },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a non-success status (e.g., invalid API key).
    #[snafu(display("API error (HTTP {status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The provider does not know the requested ticker.
    #[snafu(display("Unknown ticker symbol: {symbol}"))]
    UnknownSymbol {
        symbol: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// A local data file could not be read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A payload could not be decoded into bars.
    #[snafu(display("Malformed bar data: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

/// Build the provider described by `config`, wrapped in a [`CachedProvider`]
/// when `cache_ttl` is non-zero.
pub fn build_provider(
    config: &ProviderConfig,
    cache_ttl: Duration,
) -> Result<Box<dyn DataProvider>, ProviderInitError> {
    let provider: Box<dyn DataProvider> = match config.kind {
        ProviderKind::Alpaca => Box::new(AlpacaProvider::from_config(config)?),
        ProviderKind::Json => {
            let path = config
                .json_path
                .clone()
                .ok_or_else(|| MissingJsonPathSnafu.build())?;
            Box::new(JsonFileProvider::new(path))
        }
    };

    if cache_ttl.is_zero() {
        Ok(provider)
    } else {
        Ok(Box::new(CachedProvider::new(provider, cache_ttl)))
    }
}
