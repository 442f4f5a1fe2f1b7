use super::{normalize_pair, ExchangeTransport};
use crate::models::{Candle, CandleSeries, CANDLE_INTERVAL_MINUTES, CANDLE_LOOKBACK};
use crate::{BotError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;

// [time, open, high, low, close, vwap, volume, count]
const OHLC_ROW_LEN: usize = 8;

/// Fetches 1-minute candles and turns the raw payload into a `CandleSeries`
#[derive(Clone)]
pub struct MarketDataClient {
    transport: Arc<dyn ExchangeTransport>,
}

impl MarketDataClient {
    pub fn new(transport: Arc<dyn ExchangeTransport>) -> Self {
        Self { transport }
    }

    /// Latest `CANDLE_LOOKBACK` candles for `symbol`, oldest first
    ///
    /// A fresh request is made on every call.
    pub async fn get_candles(&self, symbol: &str) -> Result<CandleSeries> {
        let pair = normalize_pair(symbol);
        let raw = self
            .transport
            .fetch_ohlc(&pair, CANDLE_INTERVAL_MINUTES)
            .await?;

        let series = parse_ohlc(symbol, &raw)?;
        tracing::debug!("{} - fetched {} candles", symbol, series.len());
        Ok(series)
    }
}

/// Parse Kraken's OHLC `result` object
///
/// The series sits under an exchange-internal pair id (e.g. `XXBTZUSD`)
/// next to a scalar `last` cursor. Exactly one array-valued entry must exist.
pub fn parse_ohlc(symbol: &str, result: &Value) -> Result<CandleSeries> {
    let object = result
        .as_object()
        .ok_or_else(|| BotError::data_format(symbol, "OHLC result is not an object"))?;

    let series: Vec<(&String, &Vec<Value>)> = object
        .iter()
        .filter_map(|(key, value)| value.as_array().map(|rows| (key, rows)))
        .collect();

    let rows = match series.as_slice() {
        [(_, rows)] => *rows,
        [] => return Err(BotError::data_format(symbol, "response contains no result series")),
        many => {
            let keys: Vec<&str> = many.iter().map(|(k, _)| k.as_str()).collect();
            return Err(BotError::data_format(
                symbol,
                format!("expected one result series, found {}: {:?}", many.len(), keys),
            ));
        }
    };

    let start = rows.len().saturating_sub(CANDLE_LOOKBACK);
    let candles = rows[start..]
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(symbol, start + i, row))
        .collect::<Result<Vec<_>>>()?;

    Ok(CandleSeries::new(symbol, candles))
}

fn parse_row(symbol: &str, index: usize, row: &Value) -> Result<Candle> {
    let fields = match row.as_array() {
        Some(fields) if fields.len() == OHLC_ROW_LEN => fields,
        _ => {
            return Err(BotError::data_format(
                symbol,
                format!("candle {} is not an {}-field row", index, OHLC_ROW_LEN),
            ))
        }
    };

    let number = |pos: usize, name: &str| -> Result<f64> {
        coerce_f64(&fields[pos]).ok_or_else(|| {
            BotError::data_format(
                symbol,
                format!("candle {} has non-numeric {}: {}", index, name, fields[pos]),
            )
        })
    };

    let seconds = number(0, "time")? as i64;
    let timestamp: DateTime<Utc> = Utc
        .timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| BotError::data_format(symbol, format!("candle {} has bad time", index)))?;

    Ok(Candle {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        vwap: number(5, "vwap")?,
        volume: number(6, "volume")?,
        trade_count: number(7, "count")?.max(0.0) as u64,
    })
}

/// Kraken sends prices as strings and counters as integers; accept both
fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
