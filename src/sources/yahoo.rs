//! Yahoo Finance chart client for Taiwan-listed stocks.
//!
//! Bare codes resolve against TWSE (`.TW`) first and fall back to TPEx
//! (`.TWO`). Uses the unofficial v8 chart API.

use super::CandleSource;
use crate::error::{Result, ScanError};
use crate::types::{Candle, Interval, Lookback};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const NOT_FOUND_CODE: &str = "Not Found";

/// Listing-board suffixes tried in order for a bare code.
pub const BOARD_SUFFIXES: [&str; 2] = [".TW", ".TWO"];

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Yahoo symbols to try for a code, in order.
pub fn candidate_symbols(code: &str) -> Vec<String> {
    let code = code.trim().to_uppercase();
    if code.contains('.') {
        vec![code]
    } else {
        BOARD_SUFFIXES
            .iter()
            .map(|suffix| format!("{}{}", code, suffix))
            .collect()
    }
}

/// Per-request timeout when a symbol's fetch budget spans every board suffix.
pub fn request_timeout(fetch_budget: Duration) -> Duration {
    fetch_budget / BOARD_SUFFIXES.len() as u32
}

/// Turn a chart payload into candles. `Ok(empty)` for an unknown symbol.
fn parse_chart(body: &str) -> Result<Vec<Candle>> {
    let data: YahooChartResponse = serde_json::from_str(body)?;

    if let Some(error) = data.chart.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(Vec::new());
        }
        return Err(ScanError::ExternalApi(format!(
            "{} - {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    Ok(normalize_bars(&timestamps, quote))
}

fn finite_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten().filter(|x| x.is_finite())
}

fn normalize_bars(timestamps: &[i64], quote: YahooQuote) -> Vec<Candle> {
    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut candles: Vec<Candle> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &secs)| {
            // Halted or missing sessions carry a null close.
            let close = finite_at(&closes, i).filter(|c| *c > 0.0)?;
            let timestamp = chrono::DateTime::from_timestamp(secs, 0)?.timestamp_millis();
            let open = finite_at(&opens, i).filter(|o| *o > 0.0).unwrap_or(close);
            let high = finite_at(&highs, i).unwrap_or(close).max(open).max(close);
            let low = finite_at(&lows, i)
                .filter(|l| *l > 0.0)
                .unwrap_or(close)
                .min(open)
                .min(close);

            Some(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume: finite_at(&volumes, i).unwrap_or(0.0).max(0.0),
            })
        })
        .collect();

    candles.sort_by_key(|c| c.timestamp);
    candles.into_iter().fold(Vec::new(), |mut acc: Vec<Candle>, candle| {
        match acc.last_mut() {
            // A repeated timestamp is the provider revising the bar.
            Some(last) if last.timestamp == candle.timestamp => *last = candle,
            _ => acc.push(candle),
        }
        acc
    })
}

/// Yahoo Finance chart client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    /// Create a client with the given per-request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a client that fits every board attempt for one symbol inside
    /// `fetch_budget`, so a slow `.TW` miss still leaves time for `.TWO`.
    pub fn with_fetch_budget(fetch_budget: Duration) -> Result<Self> {
        Self::new(request_timeout(fetch_budget))
    }

    /// Point the client at another chart host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the chart for one fully-qualified Yahoo symbol.
    pub async fn get_chart(
        &self,
        yahoo_symbol: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            self.base_url, yahoo_symbol, lookback, interval
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ScanError::ExternalApi(format!(
                "{} returned {}",
                yahoo_symbol, status
            )));
        }

        let body = response.text().await?;
        parse_chart(&body)
    }
}

#[async_trait]
impl CandleSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Vec<Candle>> {
        for yahoo_symbol in candidate_symbols(symbol) {
            let candles = self.get_chart(&yahoo_symbol, lookback, interval).await?;
            if !candles.is_empty() {
                debug!("{} resolved as {} ({} bars)", symbol, yahoo_symbol, candles.len());
                return Ok(candles);
            }
        }
        Ok(Vec::new())
    }
}
