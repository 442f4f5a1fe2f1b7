use std::sync::Arc;

use crate::api::{normalize_pair, ExchangeTransport};
use crate::models::{OrderRequest, OrderResult, OrderSide};
use crate::{BotError, Result};

/// Submits fixed-volume market orders
///
/// Fire-and-log: the exchange result is logged and returned, never
/// interpreted. No retries.
#[derive(Clone)]
pub struct OrderExecutor {
    transport: Arc<dyn ExchangeTransport>,
    volume: f64,
}

impl OrderExecutor {
    pub fn new(transport: Arc<dyn ExchangeTransport>, volume: f64) -> Self {
        Self { transport, volume }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Place a market order for the full configured volume
    pub async fn place_order(&self, symbol: &str, side: OrderSide) -> Result<OrderResult> {
        let request = OrderRequest::market(normalize_pair(symbol), side, self.volume);

        tracing::info!(
            "📤 Submitting {} market order: {} {} ({})",
            side.as_str().to_uppercase(),
            request.volume,
            symbol,
            request.pair
        );

        let raw = self
            .transport
            .submit_order(&request)
            .await
            .map_err(|e| match e {
                BotError::Order { .. } => e,
                other => BotError::order(symbol, other.to_string()),
            })?;

        let result = OrderResult { raw };
        tracing::info!("📥 Order result for {}: {}", symbol, result);

        Ok(result)
    }
}
