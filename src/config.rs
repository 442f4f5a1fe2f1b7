use crate::{BotError, Result};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;

const ENV_PREFIX: &str = "RSIBOT";
const CONFIG_FILE: &str = "rsibot";

pub const DEFAULT_API_URL: &str = "https://api.kraken.com";
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_RSI_OVERSOLD: f64 = 30.0;
pub const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;

/// Process-wide trading settings, loaded once at startup
#[derive(Clone, Deserialize)]
pub struct TradingConfig {
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
    pub trading_pairs: Vec<String>,
    pub trade_volume: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl TradingConfig {
    /// Load from defaults, an optional `rsibot.toml`, then `RSIBOT_*` env vars
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn load() -> Result<Self> {
        let builder = with_defaults(Config::builder())?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("trading_pairs"),
            );

        Self::from_builder(builder)
    }

    /// Parse a TOML document on top of the built-in defaults
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let builder =
            with_defaults(Config::builder())?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the trading loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() || self.api_secret.trim().is_empty() {
            return Err(BotError::Config("API key and secret are required".into()));
        }
        if self.trading_pairs.is_empty() {
            return Err(BotError::Config("at least one trading pair is required".into()));
        }
        if let Some(pos) = self.trading_pairs.iter().position(|p| p.trim().is_empty()) {
            return Err(BotError::Config(format!(
                "trading_pairs[{}] is blank",
                pos
            )));
        }
        if !self.trade_volume.is_finite() || self.trade_volume <= 0.0 {
            return Err(BotError::Config(format!(
                "trade_volume must be positive, got {}",
                self.trade_volume
            )));
        }
        if self.rsi_period == 0 {
            return Err(BotError::Config("rsi_period must be at least 1".into()));
        }
        if !self.rsi_oversold.is_finite()
            || !self.rsi_overbought.is_finite()
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(BotError::Config(format!(
                "rsi_oversold ({}) must be below rsi_overbought ({})",
                self.rsi_oversold, self.rsi_overbought
            )));
        }
        Ok(())
    }
}

fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
    Ok(builder
        .set_default("api_url", DEFAULT_API_URL)?
        .set_default("rsi_period", DEFAULT_RSI_PERIOD as i64)?
        .set_default("rsi_oversold", DEFAULT_RSI_OVERSOLD)?
        .set_default("rsi_overbought", DEFAULT_RSI_OVERBOUGHT)?)
}

// Keep the secret out of logs
impl fmt::Debug for TradingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradingConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("trading_pairs", &self.trading_pairs)
            .field("trade_volume", &self.trade_volume)
            .field("rsi_period", &self.rsi_period)
            .field("rsi_oversold", &self.rsi_oversold)
            .field("rsi_overbought", &self.rsi_overbought)
            .finish()
    }
}
