//! Scan orchestrator.
//!
//! Fans a symbol universe out over a [`CandleSource`] with bounded
//! concurrency, runs each symbol through indicators and rules, and merges the
//! hits into a deterministic ranking. A failing symbol never affects the rest.

use super::indicators::{compute_indicators, IndicatorParams};
use super::signals::{build_hit, evaluate, liquidity_gate, wave_position, RuleConfig};
use crate::error::{Result, ScanError};
use crate::sources::CandleSource;
use crate::types::{
    Candle, CandleSeries, IndicatorFrame, Interval, Lookback, ScanResult, ScanStats, ScanStatus,
    SignalHit, SymbolInfo, WavePosition,
};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Scan tuning knobs.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum hits returned.
    pub top_n: usize,
    /// Maximum in-flight fetches.
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    /// Overall budget for one scan.
    pub deadline: Duration,
    /// Fewer bars than this skips the symbol.
    pub min_history: usize,
    pub lookback: Lookback,
    pub interval: Interval,
    /// Fetch the 60m and 30m charts of each hit for its wave coordinate.
    pub wave_position: bool,
    pub indicators: IndicatorParams,
    pub rules: RuleConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            concurrency: 8,
            fetch_timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(60),
            min_history: 30,
            lookback: Lookback::default(),
            interval: Interval::default(),
            wave_position: true,
            indicators: IndicatorParams::default(),
            rules: RuleConfig::default(),
        }
    }
}

/// Terminal state of one symbol within a scan.
#[derive(Debug)]
pub enum SymbolOutcome {
    /// Fetched, but too few bars to evaluate.
    InsufficientHistory { bars: usize },
    /// Provider error, malformed data or fetch timeout.
    FetchFailed(ScanError),
    /// Latest volume under the liquidity floor without a surge.
    Illiquid,
    NoSignal,
    Hit(SignalHit),
}

/// Sort by score descending, then symbol ascending, and keep the first `top_n`.
pub fn rank_hits(mut hits: Vec<SignalHit>, top_n: usize) -> Vec<SignalHit> {
    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.symbol.cmp(&b.symbol)));
    hits.truncate(top_n);
    hits
}

/// Runs scans against a candle source.
pub struct Scanner {
    source: Arc<dyn CandleSource>,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(source: Arc<dyn CandleSource>, config: ScanConfig) -> Self {
        Self { source, config }
    }

    /// Scan `symbols` until done or until the deadline elapses.
    pub async fn scan(&self, symbols: &[SymbolInfo]) -> Result<ScanResult> {
        self.scan_until_cancelled(symbols, CancellationToken::new())
            .await
    }

    /// Scan `symbols`, stopping early on the deadline or when `cancel` fires.
    ///
    /// Stopping early returns the hits collected so far with
    /// [`ScanStatus::Incomplete`]. Fails with
    /// [`ScanError::ProviderUnreachable`] only when every symbol failed to fetch.
    pub async fn scan_until_cancelled(
        &self,
        symbols: &[SymbolInfo],
        cancel: CancellationToken,
    ) -> Result<ScanResult> {
        let started = Instant::now();
        let mut stats = ScanStats {
            requested: symbols.len(),
            ..ScanStats::default()
        };
        let mut hits = Vec::new();
        let mut status = ScanStatus::Complete;

        info!(
            symbols = symbols.len(),
            source = self.source.name(),
            concurrency = self.config.concurrency,
            "Starting scan"
        );

        let mut outcomes = stream::iter(symbols)
            .map(|symbol| async move { (symbol, self.scan_symbol(symbol).await) })
            .buffer_unordered(self.config.concurrency.max(1));

        let deadline = tokio::time::sleep(self.config.deadline);
        tokio::pin!(deadline);

        let mut finished = 0usize;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Scan cancelled after {} of {} symbols", finished, symbols.len());
                    status = ScanStatus::Incomplete;
                    break;
                }
                _ = &mut deadline => {
                    warn!(
                        "Scan deadline of {:?} elapsed after {} of {} symbols",
                        self.config.deadline,
                        finished,
                        symbols.len()
                    );
                    status = ScanStatus::Incomplete;
                    break;
                }
                next = outcomes.next() => {
                    let Some((symbol, outcome)) = next else { break };
                    finished += 1;
                    record(symbol, outcome, &mut stats, &mut hits);
                }
            }
        }
        stats.abandoned = symbols.len() - finished;

        if !symbols.is_empty() && stats.failed == symbols.len() {
            return Err(ScanError::ProviderUnreachable {
                attempted: symbols.len(),
            });
        }

        stats.hits = hits.len();
        let hits = rank_hits(hits, self.config.top_n);

        info!(
            hits = stats.hits,
            no_signal = stats.no_signal,
            illiquid = stats.illiquid,
            insufficient_history = stats.insufficient_history,
            failed = stats.failed,
            abandoned = stats.abandoned,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan finished"
        );

        Ok(ScanResult {
            hits,
            status,
            stats,
        })
    }

    /// Fetch and assess one symbol.
    ///
    /// Hits also get a wave coordinate when `wave_position` is on; a failed
    /// intraday fetch leaves it empty without failing the symbol.
    pub async fn scan_symbol(&self, symbol: &SymbolInfo) -> SymbolOutcome {
        let candles = match self
            .fetch(symbol, self.config.lookback, self.config.interval)
            .await
        {
            Ok(candles) => candles,
            Err(e) => return SymbolOutcome::FetchFailed(e),
        };
        let frame = match self.prepare(candles) {
            Ok(frame) => frame,
            Err(outcome) => return outcome,
        };

        let mut outcome = self.assess_frame(symbol, &frame);
        if let SymbolOutcome::Hit(hit) = &mut outcome {
            if self.config.wave_position {
                hit.wave = self.locate_wave(symbol, &frame).await;
            }
        }
        outcome
    }

    async fn fetch(
        &self,
        symbol: &SymbolInfo,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Candle>> {
        let fetch = self.source.fetch_ohlcv(&symbol.code, lookback, interval);
        match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(ScanError::FetchTimeout {
                symbol: symbol.code.clone(),
            }),
        }
    }

    fn prepare(&self, candles: Vec<Candle>) -> std::result::Result<IndicatorFrame, SymbolOutcome> {
        if candles.len() < self.config.min_history {
            return Err(SymbolOutcome::InsufficientHistory {
                bars: candles.len(),
            });
        }

        let series = match CandleSeries::new(candles) {
            Ok(series) => series,
            Err(ScanError::InsufficientHistory { bars, .. }) => {
                return Err(SymbolOutcome::InsufficientHistory { bars })
            }
            Err(e) => return Err(SymbolOutcome::FetchFailed(e)),
        };

        Ok(compute_indicators(&series, &self.config.indicators))
    }

    /// Run a computed frame through the liquidity gate and rules.
    fn assess_frame(&self, symbol: &SymbolInfo, frame: &IndicatorFrame) -> SymbolOutcome {
        if !liquidity_gate(frame, &self.config.rules) {
            return SymbolOutcome::Illiquid;
        }

        let evaluation = evaluate(frame, &self.config.rules);
        if !evaluation.is_hit() {
            return SymbolOutcome::NoSignal;
        }

        SymbolOutcome::Hit(build_hit(symbol, frame, evaluation))
    }

    async fn locate_wave(
        &self,
        symbol: &SymbolInfo,
        daily: &IndicatorFrame,
    ) -> Option<WavePosition> {
        let sixty_minute = self
            .intraday_frame(symbol, Lookback::OneMonth, Interval::SixtyMinutes)
            .await?;
        let thirty_minute = self
            .intraday_frame(symbol, Lookback::FiveDays, Interval::ThirtyMinutes)
            .await?;
        wave_position(daily, &sixty_minute, &thirty_minute)
    }

    async fn intraday_frame(
        &self,
        symbol: &SymbolInfo,
        lookback: Lookback,
        interval: Interval,
    ) -> Option<IndicatorFrame> {
        let candles = match self.fetch(symbol, lookback, interval).await {
            Ok(candles) => candles,
            Err(e) => {
                debug!("{}: {} chart unavailable: {}", symbol.code, interval, e);
                return None;
            }
        };
        match CandleSeries::new(candles) {
            Ok(series) => Some(compute_indicators(&series, &self.config.indicators)),
            Err(e) => {
                debug!("{}: {} chart unusable: {}", symbol.code, interval, e);
                None
            }
        }
    }
}

fn record(
    symbol: &SymbolInfo,
    outcome: SymbolOutcome,
    stats: &mut ScanStats,
    hits: &mut Vec<SignalHit>,
) {
    match outcome {
        SymbolOutcome::InsufficientHistory { bars } => {
            debug!("{}: {} bars, skipping", symbol.code, bars);
            stats.insufficient_history += 1;
        }
        SymbolOutcome::FetchFailed(e) => {
            warn!("{}: fetch failed: {}", symbol.code, e);
            stats.failed += 1;
        }
        SymbolOutcome::Illiquid => {
            debug!("{}: below liquidity floor", symbol.code);
            stats.illiquid += 1;
        }
        SymbolOutcome::NoSignal => {
            debug!("{}: no signal", symbol.code);
            stats.no_signal += 1;
        }
        SymbolOutcome::Hit(hit) => {
            debug!("{}: score {}", symbol.code, hit.score);
            hits.push(hit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(symbol: &str, score: u32) -> SignalHit {
        SignalHit {
            symbol: symbol.to_string(),
            display_name: symbol.to_string(),
            as_of_timestamp: 0,
            score,
            matched_rules: Vec::new(),
            latest_price: 100.0,
            latest_volume: 1_000_000.0,
            change_pct: 0.0,
            outlook: None,
            wave: None,
        }
    }

    #[test]
    fn test_rank_hits_orders_by_score_then_symbol() {
        let ranked = rank_hits(
            vec![hit("2330", 30), hit("2454", 55), hit("1101", 30)],
            20,
        );
        let order: Vec<(&str, u32)> = ranked.iter().map(|h| (h.symbol.as_str(), h.score)).collect();
        assert_eq!(order, vec![("2454", 55), ("1101", 30), ("2330", 30)]);
    }

    #[test]
    fn test_rank_hits_truncates() {
        let hits = (0..30).map(|i| hit(&format!("{:04}", i), i)).collect();
        let ranked = rank_hits(hits, 20);
        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked[0].score, 29);
        assert!(rank_hits(vec![hit("1", 1)], 0).is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.top_n, 20);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.min_history, 30);
        assert!(config.wave_position);
    }
}
