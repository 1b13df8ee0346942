//! Remote retrieval of full daily history from Alpha Vantage.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::transform::{self, RawSeries, TransformError};
use crate::{CacheEntry, RetrievalConfig, Symbol, UtcDateTime};

const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
const ERROR_MESSAGE_KEY: &str = "Error Message";
const INFORMATION_KEY: &str = "Information";
/// Older free-tier throttling responses use `Note` instead of `Information`.
const NOTE_KEY: &str = "Note";

/// Fetch-layer failures. None of them are retried here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("API limit: {0}")]
    RateLimited(String),
    #[error("API error: {0}")]
    Provider(String),
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    InvalidRecord(#[from] TransformError),
}

/// Issues one `TIME_SERIES_DAILY` (`outputsize=full`) request per fetch.
#[derive(Clone)]
pub struct AlphaVantageFetcher {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
}

impl AlphaVantageFetcher {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &RetrievalConfig) -> Self {
        Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout_ms: config.request_timeout_ms,
        }
    }

    /// Fetcher over the production reqwest transport.
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), config)
    }

    fn endpoint(&self, symbol: &Symbol) -> String {
        format!(
            "{}?function=TIME_SERIES_DAILY&symbol={}&outputsize=full&apikey={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Retrieve, validate and normalize the full daily history for `symbol`.
    pub async fn fetch(&self, symbol: &Symbol) -> Result<CacheEntry, FetchError> {
        info!(%symbol, "fetching daily history from Alpha Vantage");

        let request = HttpRequest::get(self.endpoint(symbol)).with_timeout_ms(self.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|error| {
            warn!(%symbol, timed_out = error.timed_out(), "provider request failed");
            FetchError::Transport(error.message().to_owned())
        })?;

        if !response.is_success() {
            warn!(%symbol, status = response.status, "provider returned an error status");
            return Err(FetchError::Transport(format!(
                "provider returned status {}",
                response.status
            )));
        }

        let raw = parse_daily_response(&response.body).inspect_err(|error| {
            warn!(%symbol, %error, "provider response rejected");
        })?;
        let records = transform::transform(&raw)?;
        debug!(%symbol, records = records.len(), "normalized provider series");

        Ok(CacheEntry::new(symbol.clone(), records, UtcDateTime::now()))
    }
}

/// Extract the daily series from a provider body, classifying the non-data shapes.
///
/// The data key wins when present; otherwise `Error Message` means the provider
/// rejected the request, and `Information`/`Note` mean the call budget is spent.
pub fn parse_daily_response(body: &str) -> Result<RawSeries, FetchError> {
    let mut object: Map<String, Value> = serde_json::from_str(body).map_err(|error| {
        FetchError::MalformedResponse(format!("body is not a JSON object: {error}"))
    })?;

    if let Some(series) = object.remove(DAILY_SERIES_KEY) {
        return serde_json::from_value(series).map_err(|error| {
            FetchError::MalformedResponse(format!("'{DAILY_SERIES_KEY}' has unexpected shape: {error}"))
        });
    }

    if let Some(message) = object.get(ERROR_MESSAGE_KEY) {
        return Err(FetchError::Provider(message_text(message)));
    }

    if let Some(message) = object.get(INFORMATION_KEY).or_else(|| object.get(NOTE_KEY)) {
        return Err(FetchError::RateLimited(message_text(message)));
    }

    Err(FetchError::MalformedResponse(format!(
        "response has no '{DAILY_SERIES_KEY}', '{ERROR_MESSAGE_KEY}' or '{INFORMATION_KEY}' key"
    )))
}

fn message_text(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| value.to_string())
}
