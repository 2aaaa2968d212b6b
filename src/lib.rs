//! twscan - Taiwan stock indicator and signal screening engine

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{Result, ScanError};
pub use services::indicators::{compute_indicators, IndicatorParams};
pub use services::scanner::{rank_hits, ScanConfig, Scanner, SymbolOutcome};
pub use services::signals::{evaluate, liquidity_gate, RuleConfig};
pub use sources::{CandleSource, YahooFinanceClient};
pub use types::*;
