//! Stochastic KD oscillator (Taiwan convention).

use super::sma::{rolling_max, rolling_min};
use super::Indicator;
use crate::types::{Candle, Series};

/// Neutral RSV used for flat windows and for bars before the first full window.
pub const NEUTRAL_RSV: f64 = 50.0;

/// Stochastic KD.
///
/// RSV = (Close - Lowest Low) / (Highest High - Lowest Low) * 100 over `period` bars.
/// K and D are recursive smoothings of RSV and K:
/// K_t = (1 - 1/k_smoothing) * K_{t-1} + RSV_t / k_smoothing, seeded at 50.
///
/// Default (9, 3, 3) gives the classic 2/3, 1/3 weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stochastic {
    period: usize,
    k_smoothing: usize,
    d_smoothing: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            period: 9,
            k_smoothing: 3,
            d_smoothing: 3,
        }
    }
}

/// RSV, K and D series.
#[derive(Debug, Clone, PartialEq)]
pub struct KdSeries {
    pub rsv: Series,
    pub k: Series,
    pub d: Series,
}

/// Filter state carried from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdState {
    pub k: f64,
    pub d: f64,
}

impl KdState {
    pub const SEED: KdState = KdState { k: 50.0, d: 50.0 };

    /// Advance by one bar. `k_smoothing` of 3 gives K = 2/3 K + 1/3 RSV.
    pub fn step(self, rsv: f64, k_smoothing: f64, d_smoothing: f64) -> KdState {
        let k = (self.k * (k_smoothing - 1.0) + rsv) / k_smoothing;
        let d = (self.d * (d_smoothing - 1.0) + k) / d_smoothing;
        KdState { k, d }
    }
}

impl Stochastic {
    pub fn new(period: usize, k_smoothing: usize, d_smoothing: usize) -> Self {
        Self {
            period,
            k_smoothing: k_smoothing.max(1),
            d_smoothing: d_smoothing.max(1),
        }
    }

    /// RSV per bar; `None` before the first full window.
    fn rsv(&self, candles: &[Candle]) -> Series {
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let highest = rolling_max(&highs, self.period);
        let lowest = rolling_min(&lows, self.period);

        candles
            .iter()
            .zip(highest.iter().zip(lowest.iter()))
            .map(|(candle, (high, low))| {
                let (high, low) = ((*high)?, (*low)?);
                let range = high - low;
                if range > 0.0 {
                    Some((candle.close - low) / range * 100.0)
                } else {
                    Some(NEUTRAL_RSV)
                }
            })
            .collect()
    }
}

impl Indicator for Stochastic {
    type Output = KdSeries;

    fn compute(&self, candles: &[Candle]) -> KdSeries {
        let rsv = self.rsv(candles);
        let k_smoothing = self.k_smoothing as f64;
        let d_smoothing = self.d_smoothing as f64;

        let states: Vec<KdState> = rsv
            .iter()
            .scan(KdState::SEED, |state, value| {
                *state = state.step(value.unwrap_or(NEUTRAL_RSV), k_smoothing, d_smoothing);
                Some(*state)
            })
            .collect();

        KdSeries {
            rsv,
            k: states.iter().map(|s| Some(s.k)).collect(),
            d: states.iter().map(|s| Some(s.d)).collect(),
        }
    }
}
