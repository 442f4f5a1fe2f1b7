// Order execution and scheduling module
pub mod executor;
pub mod scheduler;
pub mod trading_loop;

pub use executor::OrderExecutor;
pub use scheduler::{FixedDelay, Limited, Scheduler, CYCLE_INTERVAL};
pub use trading_loop::{CycleReport, SymbolOutcome, SymbolReport, TradingLoop};
