/// Core types passed between the pipeline and its display consumers
///
/// Records serialise flat with camelCase keys, eg/
/// `{"instrumentId":"ALPHA_175","symbol":"KGEN","mulPoint":4,"severity":"alert",...}`
use crate::shared::classifier::Severity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tracked instrument, as resolved from the exchange token list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Instrument {
    /// Exchange-internal key used to request trades (eg/ "ALPHA_175")
    pub id: String,
    /// Display ticker (eg/ "KGEN")
    pub symbol: String,
    /// Opaque multiplier weight, emitted exactly as received and omitted when absent
    #[serde(
        rename = "mulPoint",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mul_point: Option<Value>,
}

impl Instrument {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            mul_point: None,
        }
    }

    pub fn with_mul_point(mut self, mul_point: impl Into<Value>) -> Self {
        self.mul_point = Some(mul_point.into());
        self
    }
}

/// Metrics carried by a complete [`ResultRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mul_point: Option<Value>,
    pub severity: Severity,
    #[serde(rename = "fluctuationBasisPoints")]
    pub fluctuation_bps: Decimal,
    /// Window notional in compact form (eg/ "33K")
    pub formatted_notional: String,
    pub min_price: Decimal,
    pub last_price: Decimal,
    pub span_seconds: Decimal,
}

/// Outcome of one instrument's pass through a polling cycle.
///
/// A record without metrics is a partial record: the instrument had no trades in the window
/// or its fetch failed. Both cases have the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub instrument_id: String,
    pub symbol: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RecordMetrics>,
}

impl ResultRecord {
    pub fn partial(instrument: &Instrument) -> Self {
        Self {
            instrument_id: instrument.id.clone(),
            symbol: instrument.symbol.clone(),
            metrics: None,
        }
    }

    pub fn complete(instrument: &Instrument, metrics: RecordMetrics) -> Self {
        Self {
            instrument_id: instrument.id.clone(),
            symbol: instrument.symbol.clone(),
            metrics: Some(metrics),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.metrics.is_none()
    }

    pub fn severity(&self) -> Option<Severity> {
        self.metrics.as_ref().map(|metrics| metrics.severity)
    }
}
