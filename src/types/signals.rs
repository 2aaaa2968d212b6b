use serde::{Deserialize, Serialize};

/// Closed catalogue of screening rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// MACD histogram flips positive, SAR bullish and K crosses above D on the same bar.
    SopTripleConfirmation,
    /// Low-zone KD turn with price support ("bottom bubbling").
    BottomReversal,
    /// Pullback without breakdown after a strong run.
    HighConsolidation,
    /// Volume spike on an up candle.
    VolumeSurge,
    /// Large-order proxy: heavy turnover with price strength.
    WhaleEntry,
    /// Sustained run of buying bars.
    ConsecutiveAccumulation,
}

impl RuleId {
    /// Every rule, in evaluation order.
    pub const ALL: [RuleId; 6] = [
        RuleId::SopTripleConfirmation,
        RuleId::BottomReversal,
        RuleId::HighConsolidation,
        RuleId::VolumeSurge,
        RuleId::WhaleEntry,
        RuleId::ConsecutiveAccumulation,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            RuleId::SopTripleConfirmation => "SOP Triple Confirmation",
            RuleId::BottomReversal => "Bottom Reversal",
            RuleId::HighConsolidation => "High Consolidation",
            RuleId::VolumeSurge => "Volume Surge",
            RuleId::WhaleEntry => "Whale Entry",
            RuleId::ConsecutiveAccumulation => "Consecutive Accumulation",
        }
    }
}

/// The numbers that made a rule fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleEvidence {
    SopTripleConfirmation {
        osc_prev: f64,
        osc: f64,
        sar: f64,
        k: f64,
        d: f64,
    },
    BottomReversal {
        k: f64,
        k_prev: f64,
        d: f64,
        close: f64,
        ma5: f64,
        osc_prev: f64,
        osc: f64,
    },
    HighConsolidation {
        k: f64,
        k_peak: f64,
        change_5d_pct: f64,
    },
    VolumeSurge {
        volume: f64,
        average_volume: f64,
        /// `None` when the average is zero.
        ratio: Option<f64>,
    },
    WhaleEntry {
        notional: f64,
        floor: f64,
        close: f64,
        prev_close: f64,
    },
    ConsecutiveAccumulation {
        streak: usize,
    },
}

/// A rule that fired, with its weight and evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRule {
    pub rule_id: RuleId,
    pub label: String,
    pub weight: u32,
    pub explanation: RuleEvidence,
}

/// Result of evaluating one indicator frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEvaluation {
    /// Additive total of matched rule weights.
    pub score: u32,
    pub matched_rules: Vec<MatchedRule>,
}

impl SignalEvaluation {
    pub fn is_hit(&self) -> bool {
        self.score > 0
    }

    pub fn matched(&self, rule: RuleId) -> bool {
        self.matched_rules.iter().any(|m| m.rule_id == rule)
    }
}

/// Trend classification from close, MA20 and MA60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    Bullish,
    Bearish,
    Ranging,
}

/// Retracement levels measured down from the recent high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub level_200: f64,
    pub level_382: f64,
    pub level_618: f64,
}

/// Side of the daily trade setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// Pullback into the 0.618 retracement while above the quarter line.
    Long,
    /// Strong trend above MA20 and MA60 with K in the upper half.
    TrendBuy,
    /// Overheated bounce below the quarter line.
    Short,
    /// No setup.
    Neutral,
}

/// Directional setup with its entry, stop-loss and target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlan {
    pub direction: TradeDirection,
    /// Price levels are `None` for [`TradeDirection::Neutral`].
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub target_price: Option<f64>,
    /// Heuristic win rate in percent.
    pub win_rate: u8,
    /// Heuristic odds of reaching the target, in percent.
    pub target_probability: u8,
}

impl TradePlan {
    pub const NEUTRAL: TradePlan = TradePlan {
        direction: TradeDirection::Neutral,
        entry_price: None,
        stop_loss: None,
        target_price: None,
        win_rate: 50,
        target_probability: 0,
    };
}

/// Entry, target and heuristic odds derived from the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutlook {
    pub trend: TrendState,
    pub fibonacci: FibonacciLevels,
    pub buy_aggressive: f64,
    pub buy_conservative: f64,
    /// Heuristic win rate in percent (50..=90).
    pub win_rate: u8,
    pub target_price: f64,
    /// Heuristic odds of reaching the target, in percent.
    pub target_probability: u8,
    pub plan: TradePlan,
}

/// Daily wave degree: `3` above the quarter line, `4` when that uptrend
/// dips under MA20, `C` below the quarter line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyWave {
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Fourth,
    #[serde(rename = "C")]
    Corrective,
}

/// 60-minute wave: `iii` above the 60m MA20, `iv` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourlyWave {
    #[serde(rename = "iii")]
    Third,
    #[serde(rename = "iv")]
    Fourth,
}

/// 30-minute wave: `b` while 30m K is under 50, `c` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinorWave {
    #[serde(rename = "b")]
    B,
    #[serde(rename = "c")]
    C,
}

/// Multi-timeframe wave coordinate, written `3-iii-b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WavePosition {
    pub daily: DailyWave,
    pub sixty_minute: HourlyWave,
    pub thirty_minute: MinorWave,
}

impl std::fmt::Display for WavePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let daily = match self.daily {
            DailyWave::Third => "3",
            DailyWave::Fourth => "4",
            DailyWave::Corrective => "C",
        };
        let sixty = match self.sixty_minute {
            HourlyWave::Third => "iii",
            HourlyWave::Fourth => "iv",
        };
        let thirty = match self.thirty_minute {
            MinorWave::B => "b",
            MinorWave::C => "c",
        };
        write!(f, "{}-{}-{}", daily, sixty, thirty)
    }
}

/// A ranked screening hit for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalHit {
    pub symbol: String,
    pub display_name: String,
    /// Timestamp of the evaluated bar, Unix milliseconds.
    pub as_of_timestamp: i64,
    pub score: u32,
    pub matched_rules: Vec<MatchedRule>,
    pub latest_price: f64,
    pub latest_volume: f64,
    /// Percent change against the previous close.
    pub change_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook: Option<StrategyOutlook>,
    /// Filled by the scanner from the 60m and 30m charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<WavePosition>,
}

impl SignalHit {
    pub fn as_of(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.as_of_timestamp)
    }
}

/// Whether the scan ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    /// Deadline elapsed or scan was cancelled; hits are partial.
    Incomplete,
}

/// Per-symbol terminal state counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub requested: usize,
    pub hits: usize,
    pub no_signal: usize,
    pub illiquid: usize,
    pub insufficient_history: usize,
    pub failed: usize,
    /// Symbols not finished when the scan stopped early.
    pub abandoned: usize,
}

/// Ranked, truncated scan output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub hits: Vec<SignalHit>,
    pub status: ScanStatus,
    pub stats: ScanStats,
}

impl ScanResult {
    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Complete
    }
}
