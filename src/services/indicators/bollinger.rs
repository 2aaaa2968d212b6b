//! Bollinger Bands indicator.

use super::sma::{mean, rolling};
use super::Indicator;
use crate::types::{Candle, Series};

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
/// - %B = (Close - Lower) / (Upper - Lower), undefined when the bands collapse
///
/// StdDev is the sample deviation (n - 1 denominator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub mid: Series,
    pub upper: Series,
    pub lower: Series,
    pub pct: Series,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    /// Sample standard deviation.
    fn std_dev(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let m = mean(values);
        let variance: f64 =
            values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        variance.sqrt()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerSeries;

    fn compute(&self, candles: &[Candle]) -> BollingerSeries {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let mid = rolling(&closes, self.period, mean);
        let std = rolling(&closes, self.period, Self::std_dev);

        let mut upper = Vec::with_capacity(closes.len());
        let mut lower = Vec::with_capacity(closes.len());
        let mut pct = Vec::with_capacity(closes.len());

        for ((close, m), s) in closes.iter().zip(mid.iter()).zip(std.iter()) {
            match (m, s) {
                (Some(m), Some(s)) => {
                    let up = m + self.std_dev_multiplier * s;
                    let low = m - self.std_dev_multiplier * s;
                    let width = up - low;
                    upper.push(Some(up));
                    lower.push(Some(low));
                    pct.push(if width > 0.0 {
                        Some((close - low) / width)
                    } else {
                        None
                    });
                }
                _ => {
                    upper.push(None);
                    lower.push(None);
                    pct.push(None);
                }
            }
        }

        BollingerSeries {
            mid,
            upper,
            lower,
            pct,
        }
    }
}
