// Trading strategy module
pub mod rsi;
pub mod signals;

pub use rsi::RsiStrategy;
pub use signals::{classify, SignalClassifier};

use crate::models::{CandleSeries, Signal};
use crate::Result;

/// Indicator reading and the signal derived from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub rsi: f64,
    pub signal: Signal,
}

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync {
    /// Generate a trading signal based on market data
    fn generate_signal(&self, series: &CandleSeries) -> Result<Evaluation>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum candles required for this strategy
    fn min_candles_required(&self) -> usize;
}
