pub mod candle;
pub mod chart;
pub mod indicator;
pub mod market;
pub mod signals;

pub use candle::*;
pub use chart::*;
pub use indicator::*;
pub use market::*;
pub use signals::*;
