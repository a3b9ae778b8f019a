/// Trade window aggregation
///
/// Reduces one instrument's batch of trades into the [`Summary`] statistics the classifier
/// and display layer consume.
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;
use volwatch_data::TradeEvent;

/// Basis points per unit of relative change (1 = 10,000 bps).
pub const BASIS_POINTS: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Decimal places the fluctuation metric is expressed to.
pub const FLUCTUATION_DECIMALS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),
}

/// Summary statistics for one instrument's trade window.
///
/// `last_price` is the price of the final trade in upstream order and need not sit between
/// `min_price` and `max_price` in any particular way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub last_price: Decimal,
    /// Σ(quantity)
    pub total_volume: Decimal,
    /// Σ(price × quantity)
    pub total_notional: Decimal,
    /// Seconds between the first and last trade (0 for a single trade)
    pub span_seconds: Decimal,
    /// ((max - min) / min) × 10,000, to 4 decimal places
    pub fluctuation_bps: Decimal,
    pub trade_count: usize,
}

/// Aggregate a chronologically ordered batch of trades.
///
/// Returns `Ok(None)` for an empty batch: no data is not an error. Trades are not re-sorted;
/// the first and last elements bound the span and the last element supplies `last_price`.
pub fn aggregate(trades: &[TradeEvent]) -> Result<Option<Summary>, AggregateError> {
    let (Some(first), Some(last)) = (trades.first(), trades.last()) else {
        return Ok(None);
    };

    let mut min_price = first.price;
    let mut max_price = first.price;
    let mut total_volume = Decimal::ZERO;
    let mut total_notional = Decimal::ZERO;

    for trade in trades {
        min_price = min_price.min(trade.price);
        max_price = max_price.max(trade.price);

        total_volume = total_volume
            .checked_add(trade.quantity)
            .ok_or_else(|| overflow("total volume"))?;

        let notional = trade.notional().ok_or_else(|| overflow("trade notional"))?;
        total_notional = total_notional
            .checked_add(notional)
            .ok_or_else(|| overflow("total notional"))?;
    }

    let fluctuation_bps = fluctuation_bps(min_price, max_price)?;

    let span_ms = last.timestamp_ms() - first.timestamp_ms();
    let span_seconds = (Decimal::from(span_ms) / Decimal::ONE_THOUSAND).normalize();

    Ok(Some(Summary {
        min_price,
        max_price,
        last_price: last.price,
        total_volume,
        total_notional,
        span_seconds,
        fluctuation_bps,
        trade_count: trades.len(),
    }))
}

/// Price range relative to the minimum price, in basis points to 4 decimal places.
///
/// A non-positive `min_price` is a [`AggregateError::DataIntegrity`] fault.
pub fn fluctuation_bps(min_price: Decimal, max_price: Decimal) -> Result<Decimal, AggregateError> {
    if min_price <= Decimal::ZERO {
        return Err(AggregateError::DataIntegrity(format!(
            "non-positive minimum price {min_price}"
        )));
    }

    let mut bps = max_price
        .checked_sub(min_price)
        .and_then(|range| range.checked_div(min_price))
        .and_then(|relative| relative.checked_mul(BASIS_POINTS))
        .ok_or_else(|| overflow("fluctuation"))?
        .round_dp_with_strategy(FLUCTUATION_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    bps.rescale(FLUCTUATION_DECIMALS);

    Ok(bps)
}

fn overflow(quantity: &str) -> AggregateError {
    AggregateError::DataIntegrity(format!("{quantity} overflowed decimal range"))
}
