use crate::error::{Result, ScanError};
use crate::services::scanner::ScanConfig;
use crate::services::signals::RuleConfig;
use crate::types::SymbolInfo;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Watch list used when `WATCH_LIST` is unset.
pub const DEFAULT_WATCH_LIST: &str =
    "2454:聯發科,2324:仁寶,4927:泰鼎-KY,8299:群聯,3017:奇鋐,6805:富世達,3661:世芯-KY,6770:力積電";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Symbols scanned by the binary.
    pub watch_list: Vec<SymbolInfo>,
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_list: SymbolInfo::parse_list(DEFAULT_WATCH_LIST),
            scan: ScanConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set but malformed keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let defaults = ScanConfig::default();
        let rules = RuleConfig::default();

        let watch_list = match vars.get("WATCH_LIST") {
            Some(raw) => SymbolInfo::parse_list(&raw),
            None => SymbolInfo::parse_list(DEFAULT_WATCH_LIST),
        };
        if watch_list.is_empty() {
            return Err(ScanError::Config("WATCH_LIST has no symbols".to_string()));
        }

        let rules = RuleConfig {
            sop_weight: vars.parse("SOP_WEIGHT", rules.sop_weight)?,
            bottom_reversal_weight: vars.parse("BOTTOM_REVERSAL_WEIGHT", rules.bottom_reversal_weight)?,
            high_consolidation_weight: vars
                .parse("HIGH_CONSOLIDATION_WEIGHT", rules.high_consolidation_weight)?,
            volume_surge_weight: vars.parse("VOLUME_SURGE_WEIGHT", rules.volume_surge_weight)?,
            whale_weight: vars.parse("WHALE_WEIGHT", rules.whale_weight)?,
            accumulation_weight: vars.parse("ACCUMULATION_WEIGHT", rules.accumulation_weight)?,
            bottom_k_ceiling: vars.parse("BOTTOM_K_CEILING", rules.bottom_k_ceiling)?,
            consolidation_k_peak: vars.parse("CONSOLIDATION_K_PEAK", rules.consolidation_k_peak)?,
            consolidation_k_low: vars.parse("CONSOLIDATION_K_LOW", rules.consolidation_k_low)?,
            consolidation_k_high: vars.parse("CONSOLIDATION_K_HIGH", rules.consolidation_k_high)?,
            consolidation_lookback: vars
                .parse("CONSOLIDATION_LOOKBACK", rules.consolidation_lookback)?,
            consolidation_max_change: vars
                .parse("CONSOLIDATION_MAX_CHANGE", rules.consolidation_max_change)?,
            price_change_lookback: vars.parse("PRICE_CHANGE_LOOKBACK", rules.price_change_lookback)?,
            exclusive_shape_rules: vars.flag("EXCLUSIVE_SHAPE_RULES", rules.exclusive_shape_rules)?,
            volume_surge_multiplier: vars
                .parse("VOLUME_SURGE_MULTIPLIER", rules.volume_surge_multiplier)?,
            whale_notional_floor: vars.parse("WHALE_NOTIONAL_FLOOR", rules.whale_notional_floor)?,
            accumulation_min_streak: vars
                .parse("ACCUMULATION_MIN_STREAK", rules.accumulation_min_streak)?,
            accumulation_max_streak: vars
                .parse("ACCUMULATION_MAX_STREAK", rules.accumulation_max_streak)?,
            liquidity_floor_shares: vars.parse("LIQUIDITY_FLOOR_SHARES", rules.liquidity_floor_shares)?,
            high_price_liquidity_floor_shares: vars.parse(
                "HIGH_PRICE_LIQUIDITY_FLOOR_SHARES",
                rules.high_price_liquidity_floor_shares,
            )?,
            high_price_threshold: vars.parse("HIGH_PRICE_THRESHOLD", rules.high_price_threshold)?,
        };

        if rules.accumulation_min_streak > rules.accumulation_max_streak {
            return Err(ScanError::Config(format!(
                "ACCUMULATION_MIN_STREAK ({}) exceeds ACCUMULATION_MAX_STREAK ({})",
                rules.accumulation_min_streak, rules.accumulation_max_streak
            )));
        }

        let concurrency: usize = vars.parse("SCAN_CONCURRENCY", defaults.concurrency)?;
        if concurrency == 0 {
            return Err(ScanError::Config("SCAN_CONCURRENCY must be at least 1".to_string()));
        }

        let scan = ScanConfig {
            top_n: vars.parse("SCAN_TOP_N", defaults.top_n)?,
            concurrency,
            fetch_timeout: Duration::from_secs(
                vars.parse("FETCH_TIMEOUT_SECS", defaults.fetch_timeout.as_secs())?,
            ),
            deadline: Duration::from_secs(
                vars.parse("SCAN_DEADLINE_SECS", defaults.deadline.as_secs())?,
            ),
            min_history: vars.parse("MIN_HISTORY_BARS", defaults.min_history)?,
            lookback: vars.parse("LOOKBACK", defaults.lookback)?,
            interval: vars.parse("INTERVAL", defaults.interval)?,
            wave_position: vars.flag("WAVE_POSITION", defaults.wave_position)?,
            indicators: defaults.indicators,
            rules,
        };

        Ok(Self { watch_list, scan })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e| ScanError::Config(format!("{}={:?}: {}", key, raw, e))),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key).as_deref() {
            None => Ok(default),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(raw) => Err(ScanError::Config(format!(
                "{}={:?}: expected true, false, 1 or 0",
                key, raw
            ))),
        }
    }
}
