//! Strategy outlook for the latest bar: trend, retracement entries, a
//! directional trade plan and the multi-timeframe wave coordinate.

use crate::types::{
    value_at, Candle, DailyWave, FibonacciLevels, HourlyWave, IndicatorFrame, MinorWave,
    StrategyOutlook, TradeDirection, TradePlan, TrendState, WavePosition,
};

/// Bars scanned for the retracement high/low.
pub const FIBONACCI_LOOKBACK: usize = 120;
/// Target distance in ATRs.
pub const TARGET_ATR_MULTIPLE: f64 = 3.0;
/// Fraction of close used when ATR is not yet defined.
pub const FALLBACK_ATR_FRACTION: f64 = 0.02;
const MAX_WIN_RATE: u8 = 90;
/// Bars scanned for the swing high/low behind the trade plan.
pub const PLAN_SWING_LOOKBACK: usize = 60;
/// K at or above this marks the 30-minute wave as `c`.
const MINOR_WAVE_K_PIVOT: f64 = 50.0;

/// Retracement levels over the last `lookback` bars, measured down from the high.
pub fn fibonacci_levels(candles: &[Candle], lookback: usize) -> Option<FibonacciLevels> {
    let window = &candles[candles.len().saturating_sub(lookback)..];
    if window.is_empty() {
        return None;
    }
    let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let range = high - low;

    Some(FibonacciLevels {
        high,
        low,
        level_200: high - range * 0.2,
        level_382: high - range * 0.382,
        level_618: high - range * 0.618,
    })
}

/// Classify the trend from close, MA20 and MA60.
pub fn trend_state(close: f64, ma20: Option<f64>, ma60: Option<f64>) -> TrendState {
    match (ma20, ma60) {
        (Some(m20), Some(m60)) if close > m20 && m20 > m60 => TrendState::Bullish,
        (Some(m20), Some(m60)) if close < m20 && m20 < m60 => TrendState::Bearish,
        _ => TrendState::Ranging,
    }
}

/// Directional setup from close, K, MA20, MA60 and the 60-bar swing.
///
/// The first matching setup wins: `Long` on an oversold pullback above MA60,
/// `TrendBuy` when riding above MA20 and MA60 with K in (50, 80), `Short` on an
/// overheated bounce below MA60.
pub fn trade_plan(close: f64, k: f64, ma20: f64, ma60: f64, swing: &FibonacciLevels) -> TradePlan {
    let setup = |direction: TradeDirection,
                 entry: f64,
                 stop_loss: f64,
                 target: f64,
                 win_rate: u8,
                 target_probability: u8| TradePlan {
        direction,
        entry_price: Some(entry),
        stop_loss: Some(stop_loss),
        target_price: Some(target),
        win_rate,
        target_probability,
    };

    if close > ma60 && k < 35.0 {
        setup(
            TradeDirection::Long,
            swing.level_618,
            swing.level_618 * 0.95,
            swing.high,
            85,
            75,
        )
    } else if close > ma60 && close > ma20 && k > 50.0 && k < 80.0 {
        setup(TradeDirection::TrendBuy, close, ma20, swing.high * 1.1, 70, 60)
    } else if close < ma60 && k > 70.0 {
        setup(
            TradeDirection::Short,
            swing.level_382,
            swing.level_382 * 1.05,
            swing.low,
            80,
            70,
        )
    } else {
        TradePlan::NEUTRAL
    }
}

/// Wave coordinate from the daily, 60-minute and 30-minute frames.
///
/// The latest daily close is compared against each timeframe. `None` until
/// the daily MA60, the 60m MA20 and the 30m K are defined.
pub fn wave_position(
    daily: &IndicatorFrame,
    sixty_minute: &IndicatorFrame,
    thirty_minute: &IndicatorFrame,
) -> Option<WavePosition> {
    if daily.is_empty() || sixty_minute.is_empty() || thirty_minute.is_empty() {
        return None;
    }
    let t = daily.last_index();
    let price = daily.candles.latest().close;

    let ma60 = daily.ma_at(60, t)?;
    let daily_wave = if price <= ma60 {
        DailyWave::Corrective
    } else if daily.ma_at(20, t).is_some_and(|ma20| price < ma20) {
        DailyWave::Fourth
    } else {
        DailyWave::Third
    };

    let ma20_60m = sixty_minute.ma_at(20, sixty_minute.last_index())?;
    let hourly_wave = if price > ma20_60m {
        HourlyWave::Third
    } else {
        HourlyWave::Fourth
    };

    let k_30m = value_at(&thirty_minute.k, thirty_minute.last_index())?;
    let minor_wave = if k_30m < MINOR_WAVE_K_PIVOT {
        MinorWave::B
    } else {
        MinorWave::C
    };

    Some(WavePosition {
        daily: daily_wave,
        sixty_minute: hourly_wave,
        thirty_minute: minor_wave,
    })
}

/// Outlook for the most recent bar. `None` until MA5 and MA20 are defined.
pub fn analyze(frame: &IndicatorFrame) -> Option<StrategyOutlook> {
    if frame.is_empty() {
        return None;
    }
    let t = frame.last_index();
    let latest = frame.candles.latest();
    let close = latest.close;

    let ma5 = frame.ma_at(5, t)?;
    let ma20 = frame.ma_at(20, t)?;
    let ma60 = frame.ma_at(60, t);
    let fibonacci = fibonacci_levels(&frame.candles, FIBONACCI_LOOKBACK)?;

    let osc = value_at(&frame.osc, t);
    let k = value_at(&frame.k, t);
    let d = value_at(&frame.d, t);
    let volume_ma = value_at(&frame.volume_ma, t);

    let bonuses = [
        (close > ma20, 10),
        (ma60.is_some_and(|m60| ma20 > m60), 10),
        (osc.is_some_and(|o| o > 0.0), 10),
        (matches!((k, d), (Some(k), Some(d)) if k < 80.0 && k > d), 10),
        (volume_ma.is_some_and(|v| latest.volume > v), 5),
    ];
    let win_rate = bonuses
        .iter()
        .filter(|(hit, _)| *hit)
        .fold(50u8, |acc, (_, bonus)| acc + bonus)
        .min(MAX_WIN_RATE);

    let atr = value_at(&frame.atr, t).unwrap_or(close * FALLBACK_ATR_FRACTION);
    let swing = fibonacci_levels(&frame.candles, PLAN_SWING_LOOKBACK)?;
    // No setup until MA60 exists.
    let plan = match (k, ma60) {
        (Some(k), Some(ma60)) => trade_plan(close, k, ma20, ma60, &swing),
        _ => TradePlan::NEUTRAL,
    };

    Some(StrategyOutlook {
        trend: trend_state(close, Some(ma20), ma60),
        fibonacci,
        buy_aggressive: ma5.max(fibonacci.level_200),
        buy_conservative: ma20.max(fibonacci.level_382),
        win_rate,
        target_price: close + TARGET_ATR_MULTIPLE * atr,
        target_probability: (f64::from(win_rate) * 0.8).floor() as u8,
        plan,
    })
}
