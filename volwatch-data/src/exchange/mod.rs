use crate::{error::DataError, trade::TradeEvent, window::TradeWindow};
use async_trait::async_trait;

/// Binance Alpha aggregated trades REST source.
pub mod binance_alpha;

/// Remote source of executed trades for a single instrument.
///
/// Implementations return every trade timestamped within the requested [`TradeWindow`],
/// in the chronological order supplied by the upstream. An upstream reporting zero trades
/// yields `Ok(vec![])`, which is distinct from a [`DataError`].
#[async_trait]
pub trait TradeWindowFetcher: Send + Sync {
    async fn fetch_window(
        &self,
        instrument_id: &str,
        window: TradeWindow,
    ) -> Result<Vec<TradeEvent>, DataError>;
}

#[async_trait]
impl<T> TradeWindowFetcher for std::sync::Arc<T>
where
    T: TradeWindowFetcher + ?Sized,
{
    async fn fetch_window(
        &self,
        instrument_id: &str,
        window: TradeWindow,
    ) -> Result<Vec<TradeEvent>, DataError> {
        (**self).fetch_window(instrument_id, window).await
    }
}
