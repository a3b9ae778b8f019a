use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalised executed trade.
///
/// ### Raw Payload Examples
/// Aggregated trade as returned by the Binance Alpha `agg-trades` endpoint:
///```json
/// {
///     "a": 5441083,
///     "p": "0.02143100",
///     "q": "1520.40000000",
///     "f": 5530214,
///     "l": 5530214,
///     "T": 1747312450511,
///     "m": true
/// }
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct TradeEvent {
    #[serde(rename = "p", with = "rust_decimal::serde::str")]
    pub price: Decimal,

    #[serde(rename = "q", with = "rust_decimal::serde::str")]
    pub quantity: Decimal,

    #[serde(rename = "T", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl TradeEvent {
    pub fn new(price: Decimal, quantity: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            price,
            quantity,
            timestamp,
        }
    }

    /// Construct a [`TradeEvent`] from a millisecond epoch timestamp.
    ///
    /// Returns `None` if the timestamp is outside the representable range.
    pub fn from_millis(price: Decimal, quantity: Decimal, timestamp_ms: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(timestamp_ms)
            .map(|timestamp| Self::new(price, quantity, timestamp))
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Price × quantity.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}
