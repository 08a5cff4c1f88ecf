pub mod commands;
pub mod params;

use crate::{errors::Error, feed::FetchError};

/// User-facing line for a failed analysis.
///
/// "Nothing to analyze" and "could not reach the data" read differently so the
/// user knows whether to change the range or retry later.
pub fn failure_message(ticker: &str, err: &Error) -> String {
    match err {
        Error::Fetch(FetchError::NoData { .. }) => {
            format!("No data returned for {ticker} in the requested range.")
        }
        Error::Fetch(err) => format!("Could not fetch data for {ticker}: {err}"),
        err => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        detector::DetectError,
        providers::{ProviderError, UnknownSymbolSnafu},
    };

    #[test]
    fn no_data_and_fetch_failures_read_differently() {
        let no_data = Error::Fetch(FetchError::NoData {
            ticker: "AAPL".into(),
        });
        assert_eq!(
            failure_message("AAPL", &no_data),
            "No data returned for AAPL in the requested range."
        );

        let unknown: ProviderError = UnknownSymbolSnafu { symbol: "ZZZZ" }.build();
        let failed = Error::Fetch(FetchError::Provider(unknown));
        assert_eq!(
            failure_message("ZZZZ", &failed),
            "Could not fetch data for ZZZZ: Unknown ticker symbol: ZZZZ"
        );

        let bad = Error::Detect(DetectError::WindowTooSmall { window: 1 });
        assert_eq!(
            failure_message("AAPL", &bad),
            "Detection failed: window must be at least 2 observations, got 1"
        );
    }
}
