use anyhow::Context;
use rsibot::execution::{FixedDelay, TradingLoop, CYCLE_INTERVAL};
use rsibot::{KrakenClient, TradingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    tracing::info!("🚀 rsibot starting");

    let config = TradingConfig::load().context("Failed to load configuration")?;

    tracing::info!("\n📊 Configuration:");
    tracing::info!("  Exchange: {}", config.api_url);
    tracing::info!("  Trade volume: {}", config.trade_volume);
    tracing::info!(
        "  RSI({}) buy < {} / sell > {}",
        config.rsi_period,
        config.rsi_oversold,
        config.rsi_overbought
    );
    tracing::info!("  Pairs: {}", config.trading_pairs.len());
    for pair in &config.trading_pairs {
        tracing::info!("    - {}", pair);
    }

    let client = KrakenClient::new(config.api_key.clone(), &config.api_secret, &config.api_url)
        .context("Failed to create Kraken client")?;

    let trading_loop = TradingLoop::new(&config, Arc::new(client));
    let mut scheduler = FixedDelay::new(CYCLE_INTERVAL);

    tracing::info!("Press Ctrl+C to stop...");

    let cycles = trading_loop.run(&mut scheduler, shutdown_signal()).await;

    tracing::info!("👋 rsibot stopped after {} cycles", cycles);
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rsibot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on Ctrl+C; if the handler cannot be installed, never resolves
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("\n⚠️  Received Ctrl+C, shutting down..."),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
