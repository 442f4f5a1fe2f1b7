pub mod kraken;
pub mod market_data;

pub use kraken::KrakenClient;
pub use market_data::MarketDataClient;

use crate::models::OrderRequest;
use crate::Result;
use async_trait::async_trait;

/// Narrow view of the exchange used by the trading loop
///
/// Implementations return the exchange's raw `result` payload; parsing
/// and interpretation happen in the callers.
#[async_trait]
pub trait ExchangeTransport: Send + Sync {
    /// Fetch the OHLC payload for a wire-format pair
    async fn fetch_ohlc(&self, pair: &str, interval_minutes: u32) -> Result<serde_json::Value>;

    /// Submit an order and return the exchange acknowledgement
    async fn submit_order(&self, order: &OrderRequest) -> Result<serde_json::Value>;
}

/// Convert an internal symbol like `BTC/USD` into the exchange form `BTCUSD`
pub fn normalize_pair(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
        .collect()
}
