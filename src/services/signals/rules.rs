//! Rule catalogue: weights, thresholds and trigger predicates.

use crate::types::{value_at, Candle, IndicatorFrame, RuleEvidence, RuleId};
use serde::{Deserialize, Serialize};

/// Weights and thresholds for every rule plus the liquidity gate.
///
/// Several of these drifted across script revisions; all are overridable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub sop_weight: u32,
    pub bottom_reversal_weight: u32,
    pub high_consolidation_weight: u32,
    pub volume_surge_weight: u32,
    pub whale_weight: u32,
    pub accumulation_weight: u32,

    /// K must be below this for a bottom reversal.
    pub bottom_k_ceiling: f64,
    /// Peak K within the lookback must exceed this for high consolidation.
    pub consolidation_k_peak: f64,
    pub consolidation_k_low: f64,
    pub consolidation_k_high: f64,
    /// Bars scanned for the K peak, today included.
    pub consolidation_lookback: usize,
    /// Maximum absolute price change over `price_change_lookback` bars (fraction).
    pub consolidation_max_change: f64,
    pub price_change_lookback: usize,
    /// Report only high consolidation when both shape rules hold.
    pub exclusive_shape_rules: bool,

    pub volume_surge_multiplier: f64,
    /// Close times volume, in NT$.
    pub whale_notional_floor: f64,
    pub accumulation_min_streak: usize,
    pub accumulation_max_streak: usize,

    /// Minimum latest volume in shares.
    pub liquidity_floor_shares: f64,
    /// Relaxed floor for names priced above `high_price_threshold`.
    pub high_price_liquidity_floor_shares: f64,
    pub high_price_threshold: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            sop_weight: 30,
            bottom_reversal_weight: 10,
            high_consolidation_weight: 10,
            volume_surge_weight: 15,
            whale_weight: 25,
            accumulation_weight: 20,

            bottom_k_ceiling: 50.0,
            consolidation_k_peak: 70.0,
            consolidation_k_low: 40.0,
            consolidation_k_high: 60.0,
            consolidation_lookback: 10,
            consolidation_max_change: 0.04,
            price_change_lookback: 5,
            exclusive_shape_rules: true,

            volume_surge_multiplier: 1.5,
            whale_notional_floor: 30_000_000.0,
            accumulation_min_streak: 3,
            accumulation_max_streak: 10,

            liquidity_floor_shares: 1_000_000.0,   // 1000 board lots
            high_price_liquidity_floor_shares: 500_000.0,
            high_price_threshold: 500.0,
        }
    }
}

impl RuleConfig {
    /// Configured weight for a rule.
    pub fn weight(&self, rule: RuleId) -> u32 {
        match rule {
            RuleId::SopTripleConfirmation => self.sop_weight,
            RuleId::BottomReversal => self.bottom_reversal_weight,
            RuleId::HighConsolidation => self.high_consolidation_weight,
            RuleId::VolumeSurge => self.volume_surge_weight,
            RuleId::WhaleEntry => self.whale_weight,
            RuleId::ConsecutiveAccumulation => self.accumulation_weight,
        }
    }

    /// Volume floor for a given price.
    pub fn liquidity_floor(&self, price: f64) -> f64 {
        if price > self.high_price_threshold {
            self.high_price_liquidity_floor_shares
        } else {
            self.liquidity_floor_shares
        }
    }
}

/// The evaluated bar and its predecessor within a frame.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    frame: &'a IndicatorFrame,
    today: usize,
}

impl<'a> Snapshot<'a> {
    /// Snapshot at `index`; needs a previous bar.
    pub fn at(frame: &'a IndicatorFrame, index: usize) -> Option<Self> {
        if index == 0 || index >= frame.len() {
            return None;
        }
        Some(Self {
            frame,
            today: index,
        })
    }

    /// Snapshot at the most recent bar.
    pub fn latest(frame: &'a IndicatorFrame) -> Option<Self> {
        Self::at(frame, frame.last_index())
    }

    pub fn index(&self) -> usize {
        self.today
    }

    pub fn today(&self) -> &'a Candle {
        &self.frame.candles[self.today]
    }

    pub fn prev(&self) -> &'a Candle {
        &self.frame.candles[self.today - 1]
    }

    /// (previous, today) values of a series.
    fn pair(&self, series: &[Option<f64>]) -> Option<(f64, f64)> {
        Some((
            value_at(series, self.today - 1)?,
            value_at(series, self.today)?,
        ))
    }

    /// OSC crosses from negative to positive on this bar.
    pub fn osc_flipped_up(&self) -> bool {
        matches!(self.pair(&self.frame.osc), Some((prev, now)) if prev < 0.0 && now > 0.0)
    }

    /// K crosses above D on this bar.
    pub fn kd_golden_cross(&self) -> bool {
        match (self.pair(&self.frame.k), self.pair(&self.frame.d)) {
            (Some((k_prev, k)), Some((d_prev, d))) => k_prev <= d_prev && k > d,
            _ => false,
        }
    }

    pub fn sar_bullish(&self) -> bool {
        self.frame
            .sar_is_bullish
            .get(self.today)
            .copied()
            .flatten()
            .unwrap_or(false)
    }

    pub fn sop(&self) -> Option<RuleEvidence> {
        if !(self.osc_flipped_up() && self.sar_bullish() && self.kd_golden_cross()) {
            return None;
        }
        let (osc_prev, osc) = self.pair(&self.frame.osc)?;
        Some(RuleEvidence::SopTripleConfirmation {
            osc_prev,
            osc,
            sar: value_at(&self.frame.sar, self.today)?,
            k: value_at(&self.frame.k, self.today)?,
            d: value_at(&self.frame.d, self.today)?,
        })
    }

    pub fn bottom_reversal(&self, config: &RuleConfig) -> Option<RuleEvidence> {
        let (k_prev, k) = self.pair(&self.frame.k)?;
        let d = value_at(&self.frame.d, self.today)?;
        let ma5 = self.frame.ma_at(5, self.today)?;
        let (osc_prev, osc) = self.pair(&self.frame.osc)?;
        let close = self.today().close;

        let low_zone = k < config.bottom_k_ceiling;
        let turning = k > k_prev || k > d;
        let supported = close > ma5;
        let improving = osc > osc_prev;

        (low_zone && turning && supported && improving).then_some(RuleEvidence::BottomReversal {
            k,
            k_prev,
            d,
            close,
            ma5,
            osc_prev,
            osc,
        })
    }

    pub fn high_consolidation(&self, config: &RuleConfig) -> Option<RuleEvidence> {
        let lookback = config.consolidation_lookback.max(1);
        if self.today + 1 < lookback || self.today < config.price_change_lookback {
            return None;
        }

        let k = value_at(&self.frame.k, self.today)?;
        let k_peak = self.frame.k[self.today + 1 - lookback..=self.today]
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        let base = self.frame.candles[self.today - config.price_change_lookback].close;
        if base <= 0.0 {
            return None;
        }
        let change = (self.today().close - base) / base;

        let was_strong = k_peak > config.consolidation_k_peak;
        let in_band = (config.consolidation_k_low..=config.consolidation_k_high).contains(&k);
        let holding = change.abs() < config.consolidation_max_change;

        (was_strong && in_band && holding).then_some(RuleEvidence::HighConsolidation {
            k,
            k_peak,
            change_5d_pct: change * 100.0,
        })
    }

    pub fn volume_surge(&self, config: &RuleConfig) -> Option<RuleEvidence> {
        let today = self.today();
        let average_volume = value_at(&self.frame.volume_ma, self.today)?;
        let surged = today.volume > config.volume_surge_multiplier * average_volume;

        (surged && today.is_up()).then(|| RuleEvidence::VolumeSurge {
            volume: today.volume,
            average_volume,
            ratio: (average_volume > 0.0).then(|| today.volume / average_volume),
        })
    }

    pub fn whale_entry(&self, config: &RuleConfig) -> Option<RuleEvidence> {
        let today = self.today();
        let prev = self.prev();
        let notional = today.notional();

        (notional > config.whale_notional_floor && today.close > prev.close).then_some(
            RuleEvidence::WhaleEntry {
                notional,
                floor: config.whale_notional_floor,
                close: today.close,
                prev_close: prev.close,
            },
        )
    }

    /// Length of the run of buying bars ending at this bar.
    pub fn buying_streak(&self) -> usize {
        let candles = &self.frame.candles[..=self.today];
        (0..candles.len())
            .rev()
            .take_while(|&i| {
                let bar = &candles[i];
                bar.is_up() || (i > 0 && bar.close > candles[i - 1].close)
            })
            .count()
    }

    pub fn accumulation(&self, config: &RuleConfig) -> Option<RuleEvidence> {
        let streak = self.buying_streak();
        (config.accumulation_min_streak..=config.accumulation_max_streak)
            .contains(&streak)
            .then_some(RuleEvidence::ConsecutiveAccumulation { streak })
    }

    /// Evidence for `rule` if it fires on this bar.
    pub fn check(&self, rule: RuleId, config: &RuleConfig) -> Option<RuleEvidence> {
        match rule {
            RuleId::SopTripleConfirmation => self.sop(),
            RuleId::BottomReversal => self.bottom_reversal(config),
            RuleId::HighConsolidation => self.high_consolidation(config),
            RuleId::VolumeSurge => self.volume_surge(config),
            RuleId::WhaleEntry => self.whale_entry(config),
            RuleId::ConsecutiveAccumulation => self.accumulation(config),
        }
    }
}
