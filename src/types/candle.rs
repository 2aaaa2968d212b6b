use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, Unix milliseconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded shares.
    pub volume: f64,
}

impl Candle {
    /// Red (up) candle in TW convention.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// Traded value in quote currency.
    pub fn notional(&self) -> f64 {
        self.close * self.volume
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(format!(
                "bar at {} has a negative or non-finite field",
                self.timestamp
            ));
        }
        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Err(format!("bar at {} has an inverted range", self.timestamp));
        }
        Ok(())
    }
}

/// Ordered, validated, non-empty candle sequence.
///
/// Timestamps are strictly increasing. Gaps (missing bars) are allowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series, rejecting empty or malformed input.
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if candles.is_empty() {
            return Err(ScanError::InsufficientHistory {
                bars: 0,
                required: 1,
            });
        }

        for candle in &candles {
            candle.validate().map_err(ScanError::InvalidSeries)?;
        }

        if let Some(pair) = candles
            .windows(2)
            .find(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(ScanError::InvalidSeries(format!(
                "timestamps not strictly increasing at {}",
                pair[1].timestamp
            )));
        }

        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Most recent bar.
    pub fn latest(&self) -> &Candle {
        // Non-empty by construction.
        &self.candles[self.candles.len() - 1]
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &Self::Target {
        &self.candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(timestamp: i64, close: f64) -> Candle {
        Candle {
            timestamp,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_series_rejects_empty() {
        let err = CandleSeries::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ScanError::InsufficientHistory { bars: 0, .. }));
    }

    #[test]
    fn test_series_rejects_unordered_timestamps() {
        let err = CandleSeries::new(vec![candle(2, 10.0), candle(1, 11.0)]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidSeries(_)));
    }

    #[test]
    fn test_series_rejects_duplicate_timestamps() {
        let err = CandleSeries::new(vec![candle(1, 10.0), candle(1, 11.0)]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidSeries(_)));
    }

    #[test]
    fn test_series_rejects_inverted_range() {
        let mut bad = candle(1, 10.0);
        bad.high = 9.0;
        assert!(CandleSeries::new(vec![bad]).is_err());
    }

    #[test]
    fn test_series_rejects_negative_volume() {
        let mut bad = candle(1, 10.0);
        bad.volume = -1.0;
        assert!(CandleSeries::new(vec![bad]).is_err());
    }

    #[test]
    fn test_series_allows_gaps() {
        let series = CandleSeries::new(vec![candle(1_000, 10.0), candle(90_000, 11.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().close, 11.0);
    }

    #[test]
    fn test_candle_helpers() {
        let c = Candle {
            timestamp: 0,
            open: 100.0,
            high: 106.0,
            low: 99.0,
            close: 105.0,
            volume: 2_000.0,
        };
        assert!(c.is_up());
        assert_eq!(c.notional(), 210_000.0);
    }
}
