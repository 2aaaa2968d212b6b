//! Signal evaluation.
//!
//! Applies the rule catalogue to the latest bar of an [`IndicatorFrame`],
//! producing an additive score with structured evidence per matched rule.

pub mod outlook;
pub mod rules;

pub use outlook::{analyze, trade_plan, wave_position};
pub use rules::{RuleConfig, Snapshot};

use crate::types::{
    IndicatorFrame, MatchedRule, RuleId, SignalEvaluation, SignalHit, SymbolInfo,
};

/// Evaluate every rule at `index`. Empty when `index` has no previous bar.
pub fn evaluate_at(frame: &IndicatorFrame, index: usize, config: &RuleConfig) -> SignalEvaluation {
    let Some(snapshot) = Snapshot::at(frame, index) else {
        return SignalEvaluation::default();
    };

    let mut matched_rules: Vec<MatchedRule> = RuleId::ALL
        .iter()
        .filter_map(|&rule| {
            snapshot.check(rule, config).map(|explanation| MatchedRule {
                rule_id: rule,
                label: rule.label().to_string(),
                weight: config.weight(rule),
                explanation,
            })
        })
        .collect();

    if config.exclusive_shape_rules
        && matched_rules
            .iter()
            .any(|m| m.rule_id == RuleId::HighConsolidation)
    {
        matched_rules.retain(|m| m.rule_id != RuleId::BottomReversal);
    }

    SignalEvaluation {
        score: matched_rules.iter().map(|m| m.weight).sum(),
        matched_rules,
    }
}

/// Evaluate every rule on the most recent bar.
pub fn evaluate(frame: &IndicatorFrame, config: &RuleConfig) -> SignalEvaluation {
    evaluate_at(frame, frame.last_index(), config)
}

/// Whether the latest bar trades enough to be worth reporting.
///
/// Volume under the price-dependent floor rejects the symbol unless the
/// volume-surge rule fires on the same bar.
pub fn liquidity_gate(frame: &IndicatorFrame, config: &RuleConfig) -> bool {
    if frame.is_empty() {
        return false;
    }
    let latest = frame.candles.latest();
    if latest.volume >= config.liquidity_floor(latest.close) {
        return true;
    }
    Snapshot::latest(frame)
        .and_then(|snapshot| snapshot.volume_surge(config))
        .is_some()
}

/// Assemble the hit record for a symbol whose evaluation scored.
pub fn build_hit(symbol: &SymbolInfo, frame: &IndicatorFrame, evaluation: SignalEvaluation) -> SignalHit {
    let latest = frame.candles.latest();
    let change_pct = match frame.len().checked_sub(2).map(|i| frame.candles[i].close) {
        Some(prev) if prev > 0.0 => (latest.close - prev) / prev * 100.0,
        _ => 0.0,
    };

    SignalHit {
        symbol: symbol.code.clone(),
        display_name: symbol.display_name.clone(),
        as_of_timestamp: latest.timestamp,
        score: evaluation.score,
        matched_rules: evaluation.matched_rules,
        latest_price: latest.close,
        latest_volume: latest.volume,
        change_pct,
        outlook: analyze(frame),
        wave: None,
    }
}
