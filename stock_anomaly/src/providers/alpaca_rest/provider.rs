use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    config::ProviderConfig,
    models::{
        bar::{Bar, BarSeries},
        request_params::PriceRequest,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DecodeSnafu, InvalidApiKeySnafu,
        MissingEnvVarSnafu, ProviderError, ProviderInitError, ReqwestSnafu, UnknownSymbolSnafu,
        ValidationSnafu,
        alpaca_rest::{
            params::{AlpacaBarsParams, construct_params},
            response::{AlpacaErrorBody, AlpacaResponse},
        },
    },
};

/// Alpaca's free plan allows 200 data API calls per minute.
const REQUESTS_PER_MINUTE: std::num::NonZeroU32 = nonzero!(200u32);

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    options: AlpacaBarsParams,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider with default options.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::from_config(&ProviderConfig::default())
    }

    /// Creates a provider using the feed, adjustment and endpoint from `config`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderInitError> {
        let api_key = get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?;
        let secret_key = get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?;
        let api_key = SecretString::from(api_key);
        let secret_key = SecretString::from(secret_key);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret())
                .context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            options: AlpacaBarsParams {
                adjustment: config.adjustment,
                feed: config.feed,
                ..AlpacaBarsParams::default()
            },
            limiter: RateLimiter::direct(Quota::per_minute(REQUESTS_PER_MINUTE)),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    async fn fetch_page(
        &self,
        query: &[(String, String)],
        symbol: &str,
    ) -> Result<AlpacaResponse, ProviderError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            let message = serde_json::from_str::<AlpacaErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);

            let invalid_symbol = message.to_lowercase().contains("invalid symbol");
            if status == StatusCode::NOT_FOUND || invalid_symbol {
                return UnknownSymbolSnafu { symbol }.fail();
            }
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response.bytes().await.context(ReqwestSnafu)?;
        serde_json::from_slice(&body).context(DecodeSnafu)
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    async fn fetch_daily(&self, request: &PriceRequest) -> Result<BarSeries, ProviderError> {
        let today = Utc::now().date_naive();
        let (start, end) = request.range.resolve(today);
        if start > today {
            return ValidationSnafu {
                message: format!("start date {start} is in the future"),
            }
            .fail();
        }
        info!(ticker = %request.ticker, %start, %end, "requesting daily bars from Alpaca");

        let mut bars: Vec<Bar> = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let query = construct_params(
                &request.ticker,
                start,
                end,
                today,
                &self.options,
                next_page_token.as_deref(),
            );
            let page = self.fetch_page(&query, &request.ticker).await?;

            // Only the requested symbol is asked for, but the payload is keyed by symbol.
            if let Some(mut by_symbol) = page.bars {
                if let Some(page_bars) = by_symbol.swap_remove(&request.ticker) {
                    debug!(count = page_bars.len(), "received page of bars");
                    bars.extend(page_bars.into_iter().map(Bar::from));
                }
            }

            next_page_token = advance_page_token(&mut seen_tokens, page.next_page_token)?;
            if next_page_token.is_none() {
                break;
            }
        }

        Ok(BarSeries {
            symbol: request.ticker.clone(),
            bars,
        })
    }
}

/// Records `next` and hands it back, or fails if the server already sent it.
/// A repeated token would otherwise loop forever on the same page.
fn advance_page_token(
    seen: &mut HashSet<String>,
    next: Option<String>,
) -> Result<Option<String>, ProviderError> {
    match next {
        Some(token) if !seen.insert(token.clone()) => ValidationSnafu {
            message: format!("Alpaca repeated page token {token}"),
        }
        .fail(),
        next => Ok(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_tokens_advance_until_exhausted() {
        let mut seen = HashSet::new();
        assert_eq!(
            advance_page_token(&mut seen, Some("a".into())).unwrap(),
            Some("a".to_string())
        );
        assert_eq!(
            advance_page_token(&mut seen, Some("b".into())).unwrap(),
            Some("b".to_string())
        );
        assert_eq!(advance_page_token(&mut seen, None).unwrap(), None);
    }

    #[test]
    fn repeated_page_token_stops_pagination() {
        let mut seen = HashSet::new();
        advance_page_token(&mut seen, Some("a".into())).unwrap();
        let err = advance_page_token(&mut seen, Some("a".into())).unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }
}
