pub mod indicators;
pub mod scanner;
pub mod signals;

pub use indicators::{compute_indicators, IndicatorParams};
pub use scanner::{rank_hits, ScanConfig, Scanner, SymbolOutcome};
pub use signals::{evaluate, liquidity_gate, RuleConfig};
