use crate::trade::TradeEvent;
use serde::{Deserialize, Serialize};

/// [`AlphaTradesResponse::code`] reported by successful Binance Alpha responses.
pub const SUCCESS_CODE: &str = "000000";

/// Binance Alpha response envelope wrapping a batch of aggregated trades.
///
/// ### Raw Payload Examples
/// Success:
///```json
/// {
///     "code": "000000",
///     "message": null,
///     "messageDetail": null,
///     "data": [
///         { "a": 5441083, "p": "0.02143100", "q": "1520.4", "T": 1747312450511, "m": true }
///     ],
///     "success": true
/// }
/// ```
///
/// Error:
///```json
/// {
///     "code": "100001005",
///     "message": "illegal parameter",
///     "messageDetail": "symbol not found",
///     "data": null,
///     "success": false
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaTradesResponse {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub message_detail: Option<String>,

    #[serde(default)]
    pub data: Option<Vec<TradeEvent>>,

    #[serde(default)]
    pub success: Option<bool>,
}

impl AlphaTradesResponse {
    /// Determine if the envelope reports an upstream error.
    pub fn is_error(&self) -> bool {
        self.success == Some(false)
            || self.code.as_deref().is_some_and(|code| code != SUCCESS_CODE)
    }

    /// Unwrap the trade batch.
    ///
    /// A success envelope (success code or `"success": true`) with `data` absent or `null`
    /// carries zero trades. An envelope with no success signal and no `data` is malformed.
    pub fn into_trades(self) -> Result<Vec<TradeEvent>, String> {
        if self.is_error() {
            let detail = self
                .message
                .or(self.message_detail)
                .unwrap_or_else(|| "no message".to_string());
            return Err(format!(
                "upstream error envelope (code {}): {detail}",
                self.code.as_deref().unwrap_or("none")
            ));
        }

        let signals_success = self.code.is_some() || self.success == Some(true);
        match self.data {
            Some(trades) => Ok(trades),
            None if signals_success => Ok(Vec::new()),
            None => Err("malformed payload: missing trade data".to_string()),
        }
    }
}
