use super::{Evaluation, SignalClassifier, Strategy};
use crate::config::TradingConfig;
use crate::indicators::compute_rsi;
use crate::models::CandleSeries;
use crate::{BotError, Result};

/// RSI threshold strategy
///
/// Buys when RSI drops below the oversold bound, sells when it rises above
/// the overbought bound. Stateless: every call looks only at the series given.
#[derive(Debug, Clone)]
pub struct RsiStrategy {
    period: usize,
    classifier: SignalClassifier,
}

impl RsiStrategy {
    pub fn new(period: usize, classifier: SignalClassifier) -> Self {
        Self { period, classifier }
    }

    pub fn from_config(config: &TradingConfig) -> Self {
        Self::new(
            config.rsi_period,
            SignalClassifier::new(config.rsi_oversold, config.rsi_overbought),
        )
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn classifier(&self) -> &SignalClassifier {
        &self.classifier
    }
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self::new(14, SignalClassifier::default())
    }
}

impl Strategy for RsiStrategy {
    fn generate_signal(&self, series: &CandleSeries) -> Result<Evaluation> {
        if series.len() < self.min_candles_required() {
            return Err(BotError::indicator(
                &series.symbol,
                format!(
                    "Insufficient data: {} candles, need {}",
                    series.len(),
                    self.min_candles_required()
                ),
            ));
        }

        let rsi = compute_rsi(&series.closes(), self.period)
            .ok_or_else(|| BotError::indicator(&series.symbol, "RSI is undefined"))?;

        Ok(Evaluation {
            rsi,
            signal: self.classifier.classify(rsi),
        })
    }

    fn name(&self) -> &str {
        "RsiStrategy"
    }

    fn min_candles_required(&self) -> usize {
        self.period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candle, Signal};
    use chrono::{TimeZone, Utc};

    fn series(closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: Utc.timestamp_opt(i as i64 * 60, 0).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                vwap: close,
                volume: 1.0,
                trade_count: 1,
            })
            .collect();
        CandleSeries::new("BTC/USD", candles)
    }

    #[test]
    fn test_falling_prices_buy() {
        let closes: Vec<f64> = (0..100).map(|i| 500.0 - i as f64).collect();
        let eval = RsiStrategy::default().generate_signal(&series(&closes)).unwrap();

        assert!(eval.rsi < 30.0);
        assert_eq!(eval.signal, Signal::Buy);
    }

    #[test]
    fn test_rising_prices_sell() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let eval = RsiStrategy::default().generate_signal(&series(&closes)).unwrap();

        assert!(eval.rsi > 70.0);
        assert_eq!(eval.signal, Signal::Sell);
    }

    #[test]
    fn test_short_history_is_indicator_error() {
        let closes: Vec<f64> = (0..14).map(|i| i as f64).collect();
        let err = RsiStrategy::default()
            .generate_signal(&series(&closes))
            .unwrap_err();

        assert!(matches!(err, BotError::Indicator { .. }));
        assert!(err.to_string().contains("BTC/USD"));
    }

    #[test]
    fn test_from_config_thresholds() {
        let config = TradingConfig::from_toml_str(
            r#"
            api_key = "k"
            api_secret = "cw=="
            trading_pairs = ["BTC/USD"]
            trade_volume = 1.0
            rsi_period = 5
            rsi_oversold = 10.0
            rsi_overbought = 90.0
            "#,
        )
        .unwrap();

        let strategy = RsiStrategy::from_config(&config);
        assert_eq!(strategy.period(), 5);
        assert_eq!(strategy.min_candles_required(), 6);
        assert_eq!(strategy.classifier().oversold, 10.0);
    }
}
