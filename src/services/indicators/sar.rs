//! Parabolic SAR (stop and reverse).

use super::Indicator;
use crate::types::{Candle, Series};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SarTrend {
    Up,
    Down,
}

/// Parabolic SAR.
///
/// Each bar: SAR_t = SAR_{t-1} + AF * (EP - SAR_{t-1}). A low below SAR in an
/// uptrend (high above SAR in a downtrend) reverses the trend: SAR jumps to the
/// old extreme point, EP resets to the current bar and AF resets. Otherwise a
/// new extreme extends EP and grows AF by `af_step` up to `af_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicSar {
    af_start: f64,
    af_step: f64,
    af_max: f64,
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.2,
        }
    }
}

/// State threaded through the bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState {
    pub trend: SarTrend,
    pub sar: f64,
    /// Extreme point: highest high of an uptrend, lowest low of a downtrend.
    pub ep: f64,
    /// Acceleration factor.
    pub af: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SarSeries {
    pub sar: Series,
    pub is_bullish: Vec<Option<bool>>,
    pub af: Series,
    pub trend: Vec<Option<SarTrend>>,
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        Self {
            af_start,
            af_step,
            af_max,
        }
    }

    pub fn af_max(&self) -> f64 {
        self.af_max
    }

    /// Initial state from the first bar. The trend starts up unless the
    /// second bar closes lower.
    pub fn seed(&self, first: &Candle, second: Option<&Candle>) -> SarState {
        let trend = match second {
            Some(next) if next.close < first.close => SarTrend::Down,
            _ => SarTrend::Up,
        };
        match trend {
            SarTrend::Up => SarState {
                trend,
                sar: first.low,
                ep: first.high,
                af: self.af_start,
            },
            SarTrend::Down => SarState {
                trend,
                sar: first.high,
                ep: first.low,
                af: self.af_start,
            },
        }
    }

    /// Advance the state by one bar.
    pub fn step(&self, state: SarState, candle: &Candle) -> SarState {
        let sar = state.sar + state.af * (state.ep - state.sar);

        match state.trend {
            SarTrend::Up if candle.low < sar => SarState {
                trend: SarTrend::Down,
                sar: state.ep,
                ep: candle.low,
                af: self.af_start,
            },
            SarTrend::Down if candle.high > sar => SarState {
                trend: SarTrend::Up,
                sar: state.ep,
                ep: candle.high,
                af: self.af_start,
            },
            SarTrend::Up if candle.high > state.ep => SarState {
                sar,
                ep: candle.high,
                af: (state.af + self.af_step).min(self.af_max),
                ..state
            },
            SarTrend::Down if candle.low < state.ep => SarState {
                sar,
                ep: candle.low,
                af: (state.af + self.af_step).min(self.af_max),
                ..state
            },
            _ => SarState { sar, ..state },
        }
    }
}

impl Indicator for ParabolicSar {
    type Output = SarSeries;

    fn compute(&self, candles: &[Candle]) -> SarSeries {
        let Some(first) = candles.first() else {
            return SarSeries {
                sar: Vec::new(),
                is_bullish: Vec::new(),
                af: Vec::new(),
                trend: Vec::new(),
            };
        };

        let seed = self.seed(first, candles.get(1));
        let states: Vec<SarState> = std::iter::once(seed)
            .chain(candles[1..].iter().scan(seed, |state, candle| {
                *state = self.step(*state, candle);
                Some(*state)
            }))
            .collect();

        SarSeries {
            sar: states.iter().map(|s| Some(s.sar)).collect(),
            is_bullish: states
                .iter()
                .zip(candles)
                .map(|(s, c)| Some(c.close > s.sar))
                .collect(),
            af: states.iter().map(|s| Some(s.af)).collect(),
            trend: states.iter().map(|s| Some(s.trend)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(i: i64, close: f64, spread: f64) -> Candle {
        Candle {
            timestamp: i,
            open: close,
            high: close + spread,
            low: close - spread,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_sar_empty() {
        let out = ParabolicSar::default().compute(&[]);
        assert!(out.sar.is_empty());
    }

    #[test]
    fn test_sar_uptrend_accelerates_and_caps() {
        let candles: Vec<Candle> = (0..40).map(|i| bar(i, 100.0 + i as f64, 1.0)).collect();
        let out = ParabolicSar::default().compute(&candles);

        let afs: Vec<f64> = out.af.iter().map(|a| a.unwrap()).collect();
        for pair in afs.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(afs.iter().all(|af| *af <= 0.2 + 1e-12));
        assert!((afs[39] - 0.2).abs() < 1e-9);
        assert!(out.trend.iter().all(|t| *t == Some(SarTrend::Up)));
    }

    #[test]
    fn test_sar_reverses_on_breach() {
        let mut candles: Vec<Candle> = (0..10).map(|i| bar(i, 100.0 + i as f64, 1.0)).collect();
        candles.push(bar(10, 80.0, 1.0));
        let out = ParabolicSar::default().compute(&candles);

        assert_eq!(out.trend[9], Some(SarTrend::Up));
        assert_eq!(out.trend[10], Some(SarTrend::Down));
        // SAR jumps to the prior extreme point (high of bar 9).
        assert_eq!(out.sar[10], Some(110.0));
        assert_eq!(out.af[10], Some(0.02));
        assert_eq!(out.is_bullish[10], Some(false));
    }

    #[test]
    fn test_sar_seed_direction() {
        let sar = ParabolicSar::default();
        let first = bar(0, 100.0, 1.0);
        let lower = bar(1, 99.0, 1.0);
        let seed = sar.seed(&first, Some(&lower));
        assert_eq!(seed.trend, SarTrend::Down);
        assert_eq!(seed.sar, 101.0);
        assert_eq!(seed.ep, 99.0);

        let seed = sar.seed(&first, None);
        assert_eq!(seed.trend, SarTrend::Up);
        assert_eq!(seed.sar, 99.0);
    }

    #[test]
    fn test_sar_custom_cap() {
        let sar = ParabolicSar::new(0.02, 0.05, 0.1);
        assert_eq!(sar.af_max(), 0.1);
        let candles: Vec<Candle> = (0..20).map(|i| bar(i, 50.0 + i as f64, 0.5)).collect();
        let out = sar.compute(&candles);
        assert!(out.af.iter().all(|af| af.unwrap() <= 0.1));
    }
}
