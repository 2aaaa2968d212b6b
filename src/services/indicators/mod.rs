//! Technical indicator implementations.
//!
//! Every indicator is a pure function of the candle slice. `compute_indicators`
//! composes them into an [`IndicatorFrame`] without mutating the input.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod sar;
pub mod sma;
pub mod stochastic;

pub use atr::Atr;
pub use bollinger::{BollingerBands, BollingerSeries};
pub use ema::ema;
pub use macd::{Macd, MacdSeries};
pub use sar::{ParabolicSar, SarSeries, SarState, SarTrend};
pub use sma::{rolling_mean, Sma};
pub use stochastic::{KdSeries, KdState, Stochastic};

use crate::types::{Candle, CandleSeries, IndicatorFrame};
use std::collections::BTreeMap;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    type Output;

    /// Compute the indicator series over all candles.
    fn compute(&self, candles: &[Candle]) -> Self::Output;
}

/// Moving-average periods the signal rules and outlook always need.
pub const REQUIRED_MA_PERIODS: [usize; 3] = [5, 20, 60];

/// Parameters for [`compute_indicators`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    /// Extra close MAs on top of [`REQUIRED_MA_PERIODS`].
    pub ma_periods: Vec<usize>,
    pub volume_ma_period: usize,
    pub stochastic: Stochastic,
    pub macd: Macd,
    pub bollinger: BollingerBands,
    pub atr: Atr,
    pub sar: ParabolicSar,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            // 22 is the SOP "attack line" used alongside the month line.
            ma_periods: vec![10, 22, 120],
            volume_ma_period: 5,
            stochastic: Stochastic::default(),
            macd: Macd::default(),
            bollinger: BollingerBands::default(),
            atr: Atr::default(),
            sar: ParabolicSar::default(),
        }
    }
}

impl IndicatorParams {
    /// Sorted, de-duplicated MA periods including the required ones.
    pub fn all_ma_periods(&self) -> Vec<usize> {
        let mut periods: Vec<usize> = REQUIRED_MA_PERIODS
            .iter()
            .chain(self.ma_periods.iter())
            .copied()
            .filter(|p| *p > 0)
            .collect();
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

/// Derive every indicator series for `series`.
pub fn compute_indicators(series: &CandleSeries, params: &IndicatorParams) -> IndicatorFrame {
    let candles: &[Candle] = series;

    let ma: BTreeMap<usize, _> = params
        .all_ma_periods()
        .into_iter()
        .map(|period| (period, Sma::new(period).compute(candles)))
        .collect();

    let kd = params.stochastic.compute(candles);
    let macd = params.macd.compute(candles);
    let bands = params.bollinger.compute(candles);
    let sar = params.sar.compute(candles);

    IndicatorFrame {
        candles: series.clone(),
        rsv: kd.rsv,
        k: kd.k,
        d: kd.d,
        dif: macd.dif,
        macd: macd.macd,
        osc: macd.osc,
        bb_mid: bands.mid,
        bb_upper: bands.upper,
        bb_lower: bands.lower,
        bb_pct: bands.pct,
        atr: params.atr.compute(candles),
        ma,
        volume_ma: rolling_mean(&series.volumes(), params.volume_ma_period),
        sar: sar.sar,
        sar_is_bullish: sar.is_bullish,
    }
}
