use super::CandleSeries;
use serde::Serialize;
use std::collections::BTreeMap;

/// A derived series aligned with its candle series. `None` marks bars where
/// the lookback window exceeds the available history.
pub type Series = Vec<Option<f64>>;

/// Value of a series at `index`, flattening out-of-range and undefined.
pub fn value_at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

/// Candles plus every derived indicator series.
///
/// Each series has the same length as `candles`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorFrame {
    pub candles: CandleSeries,
    pub rsv: Series,
    pub k: Series,
    pub d: Series,
    pub dif: Series,
    pub macd: Series,
    pub osc: Series,
    pub bb_mid: Series,
    pub bb_upper: Series,
    pub bb_lower: Series,
    pub bb_pct: Series,
    pub atr: Series,
    /// Moving averages of close keyed by period.
    pub ma: BTreeMap<usize, Series>,
    pub volume_ma: Series,
    pub sar: Series,
    pub sar_is_bullish: Vec<Option<bool>>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Index of the most recent bar.
    pub fn last_index(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Moving average of close for `period` at `index`, if computed.
    pub fn ma_at(&self, period: usize, index: usize) -> Option<f64> {
        self.ma.get(&period).and_then(|s| value_at(s, index))
    }
}
