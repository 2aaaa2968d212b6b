//! Average True Range (ATR) indicator.

use super::sma::rolling_mean_opt;
use super::Indicator;
use crate::types::{Candle, Series};

/// ATR (Average True Range) indicator.
///
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|), undefined on the
/// first bar. ATR is the simple rolling mean of TR over `period` bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Calculate True Range.
    pub fn true_range(current: &Candle, previous: &Candle) -> f64 {
        let hl = current.high - current.low;
        let hc = (current.high - previous.close).abs();
        let lc = (current.low - previous.close).abs();
        hl.max(hc).max(lc)
    }
}

impl Indicator for Atr {
    type Output = Series;

    fn compute(&self, candles: &[Candle]) -> Series {
        let true_ranges: Series = std::iter::once(None)
            .chain(
                candles
                    .windows(2)
                    .map(|pair| Some(Self::true_range(&pair[1], &pair[0]))),
            )
            .take(candles.len())
            .collect();

        rolling_mean_opt(&true_ranges, self.period)
    }
}
