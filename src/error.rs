use thiserror::Error;

/// Everything that can go wrong while processing a symbol or starting up.
#[derive(Debug, Error)]
pub enum BotError {
    /// Market data response missing, malformed, or not numeric
    #[error("bad market data for {symbol}: {detail}")]
    DataFormat { symbol: String, detail: String },

    /// Not enough history, or the indicator came out undefined
    #[error("RSI unavailable for {symbol}: {detail}")]
    Indicator { symbol: String, detail: String },

    /// Order rejected by the exchange or lost in transport
    #[error("order for {symbol} failed: {detail}")]
    Order { symbol: String, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn data_format(symbol: &str, detail: impl Into<String>) -> Self {
        Self::DataFormat {
            symbol: symbol.to_string(),
            detail: detail.into(),
        }
    }

    pub fn indicator(symbol: &str, detail: impl Into<String>) -> Self {
        Self::Indicator {
            symbol: symbol.to_string(),
            detail: detail.into(),
        }
    }

    pub fn order(symbol: &str, detail: impl Into<String>) -> Self {
        Self::Order {
            symbol: symbol.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Transport(format!("invalid JSON: {}", e))
    }
}

impl From<::config::ConfigError> for BotError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
