//! Compact magnitude formatting (`1500` -> `2K`, `2_500_000` -> `3M`).
//!
//! A single table of unit thresholds drives every path, so values with and without a unit
//! suffix share one rounding rule: half away from zero, trailing zeros stripped.

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use thiserror::Error;

/// Unit thresholds scanned from largest to smallest. Magnitudes below the final threshold
/// also use the final (empty) suffix.
const UNITS: [(Decimal, &str); 4] = [
    (Decimal::from_parts(1_000_000_000, 0, 0, false, 0), "B"),
    (Decimal::from_parts(1_000_000, 0, 0, false, 0), "M"),
    (Decimal::from_parts(1_000, 0, 0, false, 0), "K"),
    (Decimal::ONE, ""),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Non-finite, unparseable, or beyond the [`Decimal`] range (about ±7.9e28).
    #[error("input is not a representable number: {0}")]
    InvalidInput(String),
}

/// Formatting options for [`format_compact_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatOptions {
    /// Decimal places kept after scaling by a unit threshold (default 0)
    pub decimals: u32,
    /// Keep `decimals` places for magnitudes without a unit suffix when they have a
    /// fractional part. Otherwise such magnitudes round to an integer.
    pub include_small_decimals: bool,
}

impl FormatOptions {
    pub fn new(decimals: u32) -> Self {
        Self {
            decimals,
            ..Default::default()
        }
    }

    pub fn with_small_decimals(mut self) -> Self {
        self.include_small_decimals = true;
        self
    }
}

/// Format `value` with `decimals` places and a `K`/`M`/`B` suffix.
pub fn format_compact(value: f64, decimals: u32) -> Result<String, FormatError> {
    format_compact_with(value, FormatOptions::new(decimals))
}

/// Format `value` according to `options`.
///
/// Floats are converted to [`Decimal`] before rounding, so magnitudes beyond
/// [`Decimal::MAX`] (about 7.9e28) are rejected as [`FormatError::InvalidInput`]. Near that
/// limit the output carries the float's own binary error (`7.9e28` prints
/// `78999999999999996927B`). Callers holding exact values should use [`format_decimal`].
pub fn format_compact_with(value: f64, options: FormatOptions) -> Result<String, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::InvalidInput(value.to_string()));
    }

    let value = Decimal::from_f64(value)
        .ok_or_else(|| FormatError::InvalidInput(format!("{value} is out of range")))?;

    Ok(format_decimal(value, options))
}

/// Parse textual input, then format it like [`format_compact`].
pub fn format_compact_str(input: &str, decimals: u32) -> Result<String, FormatError> {
    let value = input
        .trim()
        .parse::<f64>()
        .map_err(|_| FormatError::InvalidInput(input.to_string()))?;

    format_compact(value, decimals)
}

/// Format an exact decimal. Infallible since every [`Decimal`] is finite.
pub fn format_decimal(value: Decimal, options: FormatOptions) -> String {
    let magnitude = value.abs();
    let (threshold, suffix) = UNITS
        .iter()
        .find(|(threshold, _)| magnitude >= *threshold)
        .copied()
        .unwrap_or(UNITS[UNITS.len() - 1]);

    let scaled = magnitude / threshold;
    let show_decimals = threshold > Decimal::ONE
        || (options.include_small_decimals && !scaled.fract().is_zero());
    let places = if show_decimals { options.decimals } else { 0 };

    let rounded = scaled
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    // Sign applies after unit selection; a magnitude that rounds to zero carries none.
    let sign = if value.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}{rounded}{suffix}")
}
