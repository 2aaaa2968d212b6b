//! Scan orchestration tests against an in-memory candle source.

mod common;

use common::{dip_and_spike, MockSource, Response};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use twscan::*;

fn symbols(codes: &[&str]) -> Vec<SymbolInfo> {
    codes.iter().map(|c| SymbolInfo::new(*c, format!("name-{}", c))).collect()
}

fn scanner(source: MockSource, config: ScanConfig) -> Scanner {
    Scanner::new(source.shared(), config)
}

#[tokio::test]
async fn test_partial_failure_isolated() {
    let source = MockSource::new()
        .with("1101", Response::Candles(dip_and_spike(100_000.0)))
        .with("2330", Response::Candles(dip_and_spike(100_000.0)))
        .with("2454", Response::Fail)
        .with("3017", Response::Candles(dip_and_spike(100_000.0)))
        .with("8299", Response::Candles(dip_and_spike(100_000.0)));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["1101", "2330", "2454", "3017", "8299"]))
        .await
        .unwrap();

    assert!(result.is_complete());
    assert_eq!(result.hits.len(), 4);
    assert!(result.hits.iter().all(|h| h.symbol != "2454"));
    assert_eq!(result.stats.failed, 1);
    assert_eq!(result.stats.hits, 4);
    assert_eq!(result.stats.requested, 5);
}

#[tokio::test]
async fn test_hits_ranked_by_score_then_symbol() {
    let source = MockSource::new()
        .with("2454", Response::Candles(dip_and_spike(100_000.0)))
        .with("1101", Response::Candles(dip_and_spike(100_000.0)))
        .with("2330", Response::Candles(dip_and_spike(1_000_000.0)));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["2454", "1101", "2330"]))
        .await
        .unwrap();

    let order: Vec<(&str, u32)> = result
        .hits
        .iter()
        .map(|h| (h.symbol.as_str(), h.score))
        .collect();
    assert_eq!(order, vec![("2330", 40), ("1101", 15), ("2454", 15)]);
    assert_eq!(result.hits[0].display_name, "name-2330");
}

#[tokio::test]
async fn test_top_n_truncates_after_ranking() {
    let source = MockSource::new()
        .with("1", Response::Candles(dip_and_spike(100_000.0)))
        .with("2", Response::Candles(dip_and_spike(1_000_000.0)))
        .with("3", Response::Candles(dip_and_spike(100_000.0)));
    let config = ScanConfig {
        top_n: 2,
        ..ScanConfig::default()
    };
    let result = scanner(source, config)
        .scan(&symbols(&["1", "2", "3"]))
        .await
        .unwrap();

    assert_eq!(result.hits.len(), 2);
    assert_eq!(result.hits[0].symbol, "2");
    assert_eq!(result.hits[1].symbol, "1");
    assert_eq!(result.stats.hits, 3);
}

#[tokio::test]
async fn test_zero_volume_never_hits() {
    let mut candles = dip_and_spike(1_000_000.0);
    if let Some(last) = candles.last_mut() {
        last.volume = 0.0;
    }
    let source = MockSource::new().with("6770", Response::Candles(candles));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["6770"]))
        .await
        .unwrap();

    assert!(result.hits.is_empty());
    assert_eq!(result.stats.illiquid, 1);
}

#[tokio::test]
async fn test_short_and_unknown_symbols_skipped() {
    let short = dip_and_spike(100_000.0).split_off(40);
    let source = MockSource::new()
        .with("4927", Response::Candles(short))
        .with("3661", Response::Candles(dip_and_spike(100_000.0)));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["4927", "9999", "3661"]))
        .await
        .unwrap();

    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.stats.insufficient_history, 2);
    assert_eq!(result.stats.failed, 0);
}

#[tokio::test]
async fn test_malformed_series_counts_as_failure() {
    let mut candles = dip_and_spike(100_000.0);
    candles[10].timestamp = candles[9].timestamp;
    let source = MockSource::new()
        .with("2324", Response::Candles(candles))
        .with("3017", Response::Candles(dip_and_spike(100_000.0)));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["2324", "3017"]))
        .await
        .unwrap();

    assert_eq!(result.stats.failed, 1);
    assert_eq!(result.hits.len(), 1);
}

#[tokio::test]
async fn test_fetch_timeout_isolates_hung_symbol() {
    let source = MockSource::new()
        .with("8299", Response::Delayed(Duration::from_secs(30), dip_and_spike(100_000.0)))
        .with("2454", Response::Candles(dip_and_spike(100_000.0)));
    let config = ScanConfig {
        fetch_timeout: Duration::from_millis(100),
        ..ScanConfig::default()
    };
    let result = scanner(source, config)
        .scan(&symbols(&["8299", "2454"]))
        .await
        .unwrap();

    assert!(result.is_complete());
    assert_eq!(result.stats.failed, 1);
    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.hits[0].symbol, "2454");
}

#[tokio::test]
async fn test_deadline_returns_incomplete() {
    let slow = Response::Delayed(Duration::from_secs(30), dip_and_spike(100_000.0));
    let source = MockSource::new()
        .with("2454", Response::Candles(dip_and_spike(100_000.0)))
        .with("2324", slow.clone())
        .with("6805", slow);
    let config = ScanConfig {
        deadline: Duration::from_millis(200),
        ..ScanConfig::default()
    };
    let result = scanner(source, config)
        .scan(&symbols(&["2454", "2324", "6805"]))
        .await
        .unwrap();

    assert_eq!(result.status, ScanStatus::Incomplete);
    assert_eq!(result.hits.len(), 1);
    assert_eq!(result.stats.abandoned, 2);
}

#[tokio::test]
async fn test_cancelled_scan_is_incomplete() {
    let source = MockSource::new()
        .with("2454", Response::Candles(dip_and_spike(100_000.0)));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = scanner(source, ScanConfig::default())
        .scan_until_cancelled(&symbols(&["2454"]), cancel)
        .await
        .unwrap();

    assert!(!result.is_complete());
    assert!(result.hits.is_empty());
    assert_eq!(result.stats.abandoned, 1);
}

#[tokio::test]
async fn test_all_failures_is_provider_unreachable() {
    let source = MockSource::new()
        .with("1101", Response::Fail)
        .with("2330", Response::Fail);
    let err = scanner(source, ScanConfig::default())
        .scan(&symbols(&["1101", "2330"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::ProviderUnreachable { attempted: 2 }));
}

#[tokio::test]
async fn test_quiet_market_is_ok() {
    let flat = common::chained(&[100.0; 60], &[2_000_000.0; 60], 0.5);
    let source = MockSource::new().with("2330", Response::Candles(flat));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["2330"]))
        .await
        .unwrap();

    assert!(result.is_complete());
    assert!(result.hits.is_empty());
    assert_eq!(result.stats.no_signal, 1);
}

#[tokio::test]
async fn test_empty_universe() {
    let result = scanner(MockSource::new(), ScanConfig::default())
        .scan(&[])
        .await
        .unwrap();
    assert!(result.is_complete());
    assert_eq!(result.stats, ScanStats::default());
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let mut source = MockSource::new();
    let codes: Vec<String> = (0..6).map(|i| format!("{}", 1000 + i)).collect();
    for code in &codes {
        source = source.with(
            code,
            Response::Delayed(Duration::from_millis(30), dip_and_spike(100_000.0)),
        );
    }
    let source = source.shared();
    let config = ScanConfig {
        concurrency: 2,
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(source.clone(), config);
    let refs: Vec<&str> = codes.iter().map(String::as_str).collect();
    let result = scanner.scan(&symbols(&refs)).await.unwrap();

    assert_eq!(result.hits.len(), 6);
    // Daily chart plus the 60m and 30m charts for each hit.
    assert_eq!(source.calls.load(Ordering::SeqCst), 18);
    assert!(source.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_scan_result_json_shape() {
    let source = MockSource::new().with("2454", Response::Candles(dip_and_spike(100_000.0)));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["2454"]))
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["status"], "complete");
    assert_eq!(json["hits"][0]["symbol"], "2454");
    assert_eq!(json["hits"][0]["score"], 15);
    assert_eq!(json["stats"]["requested"], 1);
    assert!(json["hits"][0]["outlook"]["winRate"].is_number());
    assert_eq!(json["hits"][0]["outlook"]["plan"]["direction"], "trend_buy");
    assert_eq!(json["hits"][0]["wave"]["daily"], "3");
}

#[tokio::test]
async fn test_hit_carries_wave_position() {
    let source = MockSource::new().with("2454", Response::Candles(dip_and_spike(100_000.0)));
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["2454"]))
        .await
        .unwrap();

    // Close 105 sits above every MA20 and MA60; the 30m K ends near 61.
    let wave = result.hits[0].wave.unwrap();
    assert_eq!(wave.to_string(), "3-iii-c");
}

#[tokio::test]
async fn test_intraday_failure_keeps_hit() {
    let source = MockSource::new()
        .with("2454", Response::Candles(dip_and_spike(100_000.0)))
        .with_chart("2454", Interval::ThirtyMinutes, Response::Fail);
    let result = scanner(source, ScanConfig::default())
        .scan(&symbols(&["2454"]))
        .await
        .unwrap();

    assert_eq!(result.hits.len(), 1);
    assert!(result.hits[0].wave.is_none());
    assert_eq!(result.stats.failed, 0);
}

#[tokio::test]
async fn test_wave_position_disabled_skips_intraday_fetches() {
    let source = MockSource::new()
        .with("2454", Response::Candles(dip_and_spike(100_000.0)))
        .shared();
    let config = ScanConfig {
        wave_position: false,
        ..ScanConfig::default()
    };
    let result = Scanner::new(source.clone(), config)
        .scan(&symbols(&["2454"]))
        .await
        .unwrap();

    assert_eq!(result.hits.len(), 1);
    assert!(result.hits[0].wave.is_none());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}
