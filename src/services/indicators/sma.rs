//! Simple Moving Average (SMA) and rolling-window helpers.

use super::Indicator;
use crate::types::{Candle, Series};

/// Apply `f` to every full window of `period` values.
///
/// The first `period - 1` entries are `None`. Each window is reduced from
/// scratch so results never depend on accumulated rounding.
pub fn rolling<F>(values: &[f64], period: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                Some(f(&values[i + 1 - period..=i]))
            }
        })
        .collect()
}

/// Rolling mean over a series that may contain undefined entries.
///
/// A window containing any `None` yields `None`.
pub fn rolling_mean_opt(values: &[Option<f64>], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let sum = window.iter().try_fold(0.0, |acc, v| v.map(|v| acc + v))?;
            Some(sum / period as f64)
        })
        .collect()
}

/// Arithmetic mean of a window.
pub fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Rolling simple mean of `values`.
pub fn rolling_mean(values: &[f64], period: usize) -> Series {
    rolling(values, period, mean)
}

pub fn rolling_max(values: &[f64], period: usize) -> Series {
    rolling(values, period, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn rolling_min(values: &[f64], period: usize) -> Series {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// SMA of close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = Series;

    fn compute(&self, candles: &[Candle]) -> Series {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        rolling_mean(&closes, self.period)
    }
}
