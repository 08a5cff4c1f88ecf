use shared_utils::config::ConfigError;
use thiserror::Error;

use crate::{
    detector::DetectError, feed::FetchError, io::sink::SinkError,
    models::request_params::RequestError,
};

/// The unified error type for the `stock_anomaly` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The ticker or date range could not be turned into a request.
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),

    /// The price series could not be obtained.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The detector rejected its parameters or input.
    #[error("Detection failed: {0}")]
    Detect(#[from] DetectError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A report could not be written.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}
