use self::trade::AlphaTradesResponse;
use crate::{
    error::DataError, exchange::TradeWindowFetcher, timeout::DEFAULT_FETCH_TIMEOUT,
    trade::TradeEvent, window::TradeWindow,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Binance Alpha response envelope and trade payload types.
pub mod trade;

/// Binance Alpha aggregated trades endpoint.
///
/// Accepts `symbol`, `startTime` and `endTime` (epoch milliseconds) query parameters.
pub const ALPHA_AGG_TRADES_URL: &str =
    "https://www.binance.com/bapi/defi/v1/public/alpha-trade/agg-trades";

/// Quote asset appended to an instrument id to form the traded symbol, eg/ `ALPHA_175USDT`.
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";

/// [`AlphaTradeFetcher`] configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaTradeFetcherConfig {
    /// Aggregated trades endpoint URL
    pub url: String,
    /// Quote asset suffix appended to each instrument id
    pub quote_asset: String,
    /// Request timeout applied to every fetch
    pub timeout: Duration,
    /// Optional HTTP(S) proxy all requests are routed through
    pub proxy: Option<String>,
}

impl Default for AlphaTradeFetcherConfig {
    fn default() -> Self {
        Self {
            url: ALPHA_AGG_TRADES_URL.to_string(),
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            proxy: None,
        }
    }
}

impl AlphaTradeFetcherConfig {
    /// Create a new configuration with a custom endpoint URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the quote asset suffix
    pub fn with_quote_asset(mut self, quote_asset: impl Into<String>) -> Self {
        self.quote_asset = quote_asset.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Route requests through an HTTP(S) proxy
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// [`TradeWindowFetcher`] polling the Binance Alpha aggregated trades REST endpoint.
#[derive(Debug, Clone)]
pub struct AlphaTradeFetcher {
    client: reqwest::Client,
    url: Url,
    quote_asset: String,
    timeout: Duration,
}

impl AlphaTradeFetcher {
    pub fn new(config: AlphaTradeFetcherConfig) -> Result<Self, DataError> {
        let url = Url::parse(&config.url)
            .map_err(|error| DataError::Config(format!("invalid url {}: {error}", config.url)))?;

        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|error| DataError::Config(format!("invalid proxy {proxy}: {error}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|error| DataError::Config(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            client,
            url,
            quote_asset: config.quote_asset,
            timeout: config.timeout,
        })
    }

    /// Traded symbol requested for an instrument id, eg/ `ALPHA_175` -> `ALPHA_175USDT`.
    pub fn market_symbol(&self, instrument_id: &str) -> String {
        format!("{instrument_id}{}", self.quote_asset)
    }

    fn transport_error(&self, instrument_id: &str, error: reqwest::Error) -> DataError {
        if error.is_timeout() {
            let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
            DataError::fetch_timeout(instrument_id, timeout_ms)
        } else if error.is_connect() {
            DataError::fetch_failed(instrument_id, format!("connection failed: {error}"))
        } else {
            DataError::fetch_failed(instrument_id, format!("request failed: {error}"))
        }
    }
}

#[async_trait]
impl TradeWindowFetcher for AlphaTradeFetcher {
    async fn fetch_window(
        &self,
        instrument_id: &str,
        window: TradeWindow,
    ) -> Result<Vec<TradeEvent>, DataError> {
        let symbol = self.market_symbol(instrument_id);
        debug!(
            %symbol,
            start_ms = window.start_ms(),
            end_ms = window.end_ms(),
            "requesting trade window"
        );

        let response = self
            .client
            .get(self.url.clone())
            .query(&[("symbol", symbol.as_str())])
            .query(&[("startTime", window.start_ms()), ("endTime", window.end_ms())])
            .send()
            .await
            .map_err(|error| self.transport_error(instrument_id, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::fetch_failed(
                instrument_id,
                format!("upstream returned status {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|error| self.transport_error(instrument_id, error))?;

        let envelope = serde_json::from_str::<AlphaTradesResponse>(&body).map_err(|error| {
            DataError::fetch_failed(instrument_id, format!("malformed payload: {error}"))
        })?;

        let trades = envelope
            .into_trades()
            .map_err(|reason| DataError::fetch_failed(instrument_id, reason))?;

        debug!(%symbol, trades = trades.len(), "received trade window");
        Ok(trades)
    }
}
