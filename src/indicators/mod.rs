// Technical indicators module
pub mod rsi;

pub use rsi::compute_rsi;
