use thiserror::Error;

/// Engine and scan error types.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Insufficient history: {bars} bars, need {required}")]
    InsufficientHistory { bars: usize, required: usize },

    #[error("Invalid candle series: {0}")]
    InvalidSeries(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Fetch timed out for {symbol}")]
    FetchTimeout { symbol: String },

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Provider unreachable: all {attempted} symbols failed to fetch")]
    ProviderUnreachable { attempted: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_message() {
        let err = ScanError::InsufficientHistory {
            bars: 12,
            required: 30,
        };
        assert_eq!(err.to_string(), "Insufficient history: 12 bars, need 30");
    }

    #[test]
    fn test_timeout_names_symbol() {
        let err = ScanError::FetchTimeout {
            symbol: "2330".to_string(),
        };
        assert_eq!(err.to_string(), "Fetch timed out for 2330");
    }
}
