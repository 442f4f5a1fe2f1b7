use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use super::{OrderExecutor, Scheduler};
use crate::api::{ExchangeTransport, MarketDataClient};
use crate::config::TradingConfig;
use crate::models::{OrderResult, OrderSide, Signal};
use crate::strategy::{RsiStrategy, Strategy};
use crate::{BotError, Result};

/// What happened to one symbol during a cycle
#[derive(Debug)]
pub enum SymbolOutcome {
    Ordered {
        rsi: f64,
        side: OrderSide,
        result: OrderResult,
    },
    Held {
        rsi: f64,
    },
    Failed {
        error: BotError,
    },
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

/// Per-symbol outcomes of one scan, in configuration order
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<SymbolReport>,
}

impl CycleReport {
    pub fn orders(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Ordered { .. }))
    }

    pub fn holds(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Held { .. }))
    }

    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Failed { .. }))
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&SymbolOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Scan every symbol, trade on RSI crossings, wait, repeat
///
/// Symbols are handled one at a time. A failure is logged and recorded for
/// that symbol only; the rest of the cycle carries on.
pub struct TradingLoop {
    symbols: Vec<String>,
    market_data: MarketDataClient,
    strategy: Box<dyn Strategy>,
    executor: OrderExecutor,
}

impl TradingLoop {
    pub fn new(config: &TradingConfig, transport: Arc<dyn ExchangeTransport>) -> Self {
        Self::with_strategy(
            config,
            transport,
            Box::new(RsiStrategy::from_config(config)),
        )
    }

    pub fn with_strategy(
        config: &TradingConfig,
        transport: Arc<dyn ExchangeTransport>,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        let mut symbols = Vec::with_capacity(config.trading_pairs.len());
        for pair in &config.trading_pairs {
            let pair = pair.trim();
            if pair.is_empty() {
                tracing::warn!("Skipping blank trading pair entry");
                continue;
            }
            symbols.push(pair.to_string());
        }

        Self {
            symbols,
            market_data: MarketDataClient::new(transport.clone()),
            strategy,
            executor: OrderExecutor::new(transport, config.trade_volume),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Fetch, evaluate and (maybe) trade a single symbol
    pub async fn process_symbol(&self, symbol: &str) -> Result<SymbolOutcome> {
        let series = self.market_data.get_candles(symbol).await?;
        let evaluation = self.strategy.generate_signal(&series)?;
        let rsi = evaluation.rsi;

        tracing::info!("{} - RSI: {:.2}", symbol, rsi);

        match evaluation.signal {
            Signal::Buy => {
                tracing::info!("🟢 {} - BUY signal (RSI {:.2} oversold)", symbol, rsi);
            }
            Signal::Sell => {
                tracing::info!("🔴 {} - SELL signal (RSI {:.2} overbought)", symbol, rsi);
            }
            Signal::Hold => {
                tracing::info!("⚪ {} - HOLD, RSI neutral, no order", symbol);
            }
        }

        let Some(side) = evaluation.signal.side() else {
            return Ok(SymbolOutcome::Held { rsi });
        };

        let result = self.executor.place_order(symbol, side).await?;
        Ok(SymbolOutcome::Ordered { rsi, side, result })
    }

    /// One pass over every configured symbol
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for symbol in &self.symbols {
            let outcome = match self.process_symbol(symbol).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::error!("✗ Error with {}: {}", symbol, error);
                    SymbolOutcome::Failed { error }
                }
            };

            report.outcomes.push(SymbolReport {
                symbol: symbol.clone(),
                outcome,
            });
        }

        report
    }

    /// Alternate scanning and waiting until `shutdown` resolves or the
    /// scheduler stops. Returns the number of completed cycles.
    ///
    /// `shutdown` is raced against both the scan and the wait, so a stop
    /// request never has to sit out a sleep or a slow request.
    pub async fn run<S, F>(&self, scheduler: &mut S, shutdown: F) -> usize
    where
        S: Scheduler + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        tracing::info!(
            "🔄 {} scanning {} symbols",
            self.strategy.name(),
            self.symbols.len()
        );

        loop {
            tracing::info!(
                "💹 [TRADING] Cycle {} at {}",
                cycles + 1,
                Utc::now().format("%H:%M:%S")
            );

            tokio::select! {
                report = self.run_cycle() => {
                    cycles += 1;
                    tracing::info!(
                        "Cycle {} complete: {} orders, {} holds, {} errors",
                        cycles,
                        report.orders(),
                        report.holds(),
                        report.failures()
                    );
                }
                _ = &mut shutdown => {
                    tracing::info!("⚠️  Shutdown requested mid-cycle");
                    break;
                }
            }

            tokio::select! {
                more = scheduler.wait() => {
                    if !more {
                        tracing::info!("Scheduler finished after {} cycles", cycles);
                        break;
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("⚠️  Shutdown requested while waiting");
                    break;
                }
            }
        }

        cycles
    }
}
