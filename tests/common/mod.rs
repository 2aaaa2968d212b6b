//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use twscan::{Candle, CandleSource, Interval, Lookback, Result, ScanError};

pub const DAY_MS: i64 = 86_400_000;
pub const START_MS: i64 = 1_700_000_000_000;

/// Candles following `closes`, each opening at the previous close.
pub fn chained(closes: &[f64], volumes: &[f64], pad: f64) -> Vec<Candle> {
    let mut prev = closes[0];
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = prev;
            prev = close;
            Candle {
                timestamp: START_MS + i as i64 * DAY_MS,
                open,
                high: open.max(close) + pad,
                low: open.min(close) - pad,
                close,
                volume,
            }
        })
        .collect()
}

/// 55 flat bars at 100, then 100, 95, 90, 98, 105 with a 2x volume spike on
/// the last bar.
pub fn dip_and_spike(base_volume: f64) -> Vec<Candle> {
    let mut closes = vec![100.0; 55];
    closes.extend([100.0, 95.0, 90.0, 98.0, 105.0]);
    let mut volumes = vec![base_volume; 59];
    volumes.push(base_volume * 2.0);
    chained(&closes, &volumes, 0.0)
}

/// Closes rising by 1 per bar with a +/-1 range.
pub fn steady_rise(len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let close = 100.0 + i as f64;
            Candle {
                timestamp: START_MS + i as i64 * DAY_MS,
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 2_000_000.0,
            }
        })
        .collect()
}

/// Canned behavior for one symbol.
#[derive(Clone)]
pub enum Response {
    Candles(Vec<Candle>),
    Fail,
    Delayed(Duration, Vec<Candle>),
}

/// In-memory candle source.
#[derive(Default)]
pub struct MockSource {
    responses: HashMap<String, Response>,
    /// Per-interval overrides, checked before `responses`.
    charts: HashMap<(String, Interval), Response>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, response: Response) -> Self {
        self.responses.insert(symbol.to_string(), response);
        self
    }

    pub fn with_chart(mut self, symbol: &str, interval: Interval, response: Response) -> Self {
        self.charts.insert((symbol.to_string(), interval), response);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CandleSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        _lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let response = self
            .charts
            .get(&(symbol.to_string(), interval))
            .or_else(|| self.responses.get(symbol))
            .cloned();
        let result = match response {
            Some(Response::Candles(candles)) => {
                tokio::task::yield_now().await;
                Ok(candles)
            }
            Some(Response::Fail) => Err(ScanError::ExternalApi(format!("{} unavailable", symbol))),
            Some(Response::Delayed(delay, candles)) => {
                tokio::time::sleep(delay).await;
                Ok(candles)
            }
            None => Ok(Vec::new()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
