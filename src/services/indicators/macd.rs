//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::ema;
use super::Indicator;
use crate::types::{Candle, Series};

/// MACD indicator.
///
/// - DIF = EMA(close, fast) - EMA(close, slow)
/// - MACD (signal line) = EMA(DIF, signal)
/// - OSC (histogram) = DIF - MACD
///
/// EMAs are seeded with the first value, so every bar is defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub dif: Series,
    pub macd: Series,
    pub osc: Series,
}

impl Indicator for Macd {
    type Output = MacdSeries;

    fn compute(&self, candles: &[Candle]) -> MacdSeries {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let fast = ema(&closes, self.fast_period);
        let slow = ema(&closes, self.slow_period);

        let dif: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = ema(&dif, self.signal_period);
        let osc: Vec<f64> = dif.iter().zip(signal.iter()).map(|(d, s)| d - s).collect();

        MacdSeries {
            dif: dif.into_iter().map(Some).collect(),
            macd: signal.into_iter().map(Some).collect(),
            osc: osc.into_iter().map(Some).collect(),
        }
    }
}
