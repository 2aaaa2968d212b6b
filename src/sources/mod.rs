//! Market-data sources.

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::types::{Candle, Interval, Lookback};
use async_trait::async_trait;

/// Provider of OHLCV candles for a symbol.
///
/// Unknown or delisted symbols yield an empty vector rather than an error.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Candle>>;
}
