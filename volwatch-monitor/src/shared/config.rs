/// Environment driven configuration for the `volwatch` monitor.
///
/// Every value has a named default; only the instrument list must be supplied, either as a
/// JSON file (`VOLWATCH_INSTRUMENTS_FILE`) or inline (`VOLWATCH_INSTRUMENTS`).
use crate::shared::{
    classifier::{AlertThresholds, DEFAULT_ALERT_BPS, DEFAULT_WARNING_BPS},
    format::FormatOptions,
    types::Instrument,
};
use rust_decimal::Decimal;
use std::{path::Path, str::FromStr, time::Duration};
use thiserror::Error;
use volwatch_data::{
    exchange::binance_alpha::{ALPHA_AGG_TRADES_URL, AlphaTradeFetcherConfig, DEFAULT_QUOTE_ASSET},
    timeout::DEFAULT_FETCH_TIMEOUT,
    window::DEFAULT_WINDOW,
};

/// Interval between polling cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const TRADES_URL_VAR: &str = "VOLWATCH_TRADES_URL";
pub const QUOTE_ASSET_VAR: &str = "VOLWATCH_QUOTE_ASSET";
pub const WINDOW_MS_VAR: &str = "VOLWATCH_WINDOW_MS";
pub const FETCH_TIMEOUT_MS_VAR: &str = "VOLWATCH_FETCH_TIMEOUT_MS";
pub const POLL_INTERVAL_MS_VAR: &str = "VOLWATCH_POLL_INTERVAL_MS";
pub const WARNING_BPS_VAR: &str = "VOLWATCH_WARNING_BPS";
pub const ALERT_BPS_VAR: &str = "VOLWATCH_ALERT_BPS";
pub const PROXY_VAR: &str = "VOLWATCH_PROXY";
pub const INSTRUMENTS_FILE_VAR: &str = "VOLWATCH_INSTRUMENTS_FILE";
pub const INSTRUMENTS_VAR: &str = "VOLWATCH_INSTRUMENTS";
pub const OUTPUT_VAR: &str = "VOLWATCH_OUTPUT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("instrument file {path}: {reason}")]
    InstrumentFile { path: String, reason: String },

    #[error("invalid instrument entry {0:?}, expected SYMBOL:ID[:MULPOINT]")]
    InstrumentEntry(String),

    #[error("no instruments configured, set VOLWATCH_INSTRUMENTS_FILE or VOLWATCH_INSTRUMENTS")]
    NoInstruments,
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Where each cycle's records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Tab separated lines with ANSI severity markers
    #[default]
    Terminal,
    /// One JSON array per cycle
    Json,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "terminal" => Ok(OutputMode::Terminal),
            "json" => Ok(OutputMode::Json),
            other => Err(format!("unknown output mode {other}, expected terminal or json")),
        }
    }
}

/// Per-cycle settings consumed by [`InstrumentPipeline`](crate::shared::pipeline::InstrumentPipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Trailing window length requested for each instrument
    pub window: Duration,
    /// Upper bound on a single instrument's fetch
    pub fetch_timeout: Duration,
    pub thresholds: AlertThresholds,
    /// Formatting applied to each window's total notional
    pub notional_format: FormatOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            thresholds: AlertThresholds::default(),
            notional_format: FormatOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Complete `volwatch` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub fetcher: AlphaTradeFetcherConfig,
    pub pipeline: PipelineConfig,
    pub poll_interval: Duration,
    pub output: OutputMode,
    pub instruments: Vec<Instrument>,
}

impl MonitorConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup, eg/ a `HashMap` in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let window = parse_millis(WINDOW_MS_VAR, var(WINDOW_MS_VAR), DEFAULT_WINDOW)?;
        let fetch_timeout = parse_millis(
            FETCH_TIMEOUT_MS_VAR,
            var(FETCH_TIMEOUT_MS_VAR),
            DEFAULT_FETCH_TIMEOUT,
        )?;
        let poll_interval = parse_millis(
            POLL_INTERVAL_MS_VAR,
            var(POLL_INTERVAL_MS_VAR),
            DEFAULT_POLL_INTERVAL,
        )?;

        let warning_bps = parse_bps(WARNING_BPS_VAR, var(WARNING_BPS_VAR), DEFAULT_WARNING_BPS)?;
        let alert_bps = parse_bps(ALERT_BPS_VAR, var(ALERT_BPS_VAR), DEFAULT_ALERT_BPS)?;
        if warning_bps > alert_bps {
            return Err(ConfigError::invalid(
                WARNING_BPS_VAR,
                &warning_bps.to_string(),
                format!("exceeds alert threshold {alert_bps}"),
            ));
        }

        let output = match var(OUTPUT_VAR) {
            Some(value) => value
                .parse()
                .map_err(|reason: String| ConfigError::invalid(OUTPUT_VAR, &value, reason))?,
            None => OutputMode::default(),
        };

        let mut fetcher = AlphaTradeFetcherConfig::new(
            var(TRADES_URL_VAR).unwrap_or_else(|| ALPHA_AGG_TRADES_URL.to_string()),
        )
        .with_quote_asset(var(QUOTE_ASSET_VAR).unwrap_or_else(|| DEFAULT_QUOTE_ASSET.to_string()))
        .with_timeout(fetch_timeout);
        if let Some(proxy) = var(PROXY_VAR) {
            fetcher = fetcher.with_proxy(proxy);
        }

        let instruments = match (var(INSTRUMENTS_FILE_VAR), var(INSTRUMENTS_VAR)) {
            (Some(path), _) => load_instruments_file(path)?,
            (None, Some(entries)) => parse_instruments(&entries)?,
            (None, None) => return Err(ConfigError::NoInstruments),
        };
        if instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }

        Ok(Self {
            fetcher,
            pipeline: PipelineConfig {
                window,
                fetch_timeout,
                thresholds: AlertThresholds::new(warning_bps, alert_bps),
                notional_format: FormatOptions::default(),
            },
            poll_interval,
            output,
            instruments,
        })
    }
}

fn parse_millis(
    key: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(key, &value, "must be greater than zero")),
        Ok(millis) => Ok(Duration::from_millis(millis)),
        Err(error) => Err(ConfigError::invalid(key, &value, error.to_string())),
    }
}

fn parse_bps(
    key: &'static str,
    value: Option<String>,
    default: Decimal,
) -> Result<Decimal, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    let bps = Decimal::from_str(value.trim())
        .map_err(|error| ConfigError::invalid(key, &value, error.to_string()))?;
    if bps.is_sign_negative() {
        return Err(ConfigError::invalid(key, &value, "must not be negative"));
    }

    Ok(bps)
}

/// Read a JSON array of `{ "id", "symbol", "mulPoint" }` objects.
pub fn load_instruments_file(path: impl AsRef<Path>) -> Result<Vec<Instrument>, ConfigError> {
    let path = path.as_ref();
    let file_error = |reason: String| ConfigError::InstrumentFile {
        path: path.display().to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|error| file_error(error.to_string()))?;
    serde_json::from_str(&contents).map_err(|error| file_error(error.to_string()))
}

/// Parse a comma separated `SYMBOL:ID[:MULPOINT]` list, eg/ `KGEN:ALPHA_175:4,TIMI:ALPHA_212`.
///
/// A `MULPOINT` that reads as a JSON number is kept as a number, anything else as a string.
pub fn parse_instruments(input: &str) -> Result<Vec<Instrument>, ConfigError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_instrument)
        .collect()
}

fn parse_instrument(entry: &str) -> Result<Instrument, ConfigError> {
    let invalid = || ConfigError::InstrumentEntry(entry.to_string());

    let mut parts = entry.split(':').map(str::trim);
    let (Some(symbol), Some(id)) = (parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if symbol.is_empty() || id.is_empty() {
        return Err(invalid());
    }

    let mul_point = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    let instrument = Instrument::new(id, symbol);
    match mul_point {
        None => Ok(instrument),
        Some("") => Err(invalid()),
        Some(text) => match serde_json::from_str::<serde_json::Number>(text) {
            Ok(number) => Ok(instrument.with_mul_point(number)),
            Err(_) => Ok(instrument.with_mul_point(text)),
        },
    }
}
