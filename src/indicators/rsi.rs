/// Calculate Relative Strength Index (RSI)
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Uses Wilder smoothing: an exponential average of gains and losses with
/// `alpha = 1 / period`. Both averages start at zero (the missing change
/// before the first close counts as flat) and every change is folded in.
/// Returns the value for the most recent close.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Returns `None` when `prices.len() <= period`, when `period` is zero, or
/// when any price is not finite.
pub fn compute_rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() <= period {
        return None;
    }
    if prices.iter().any(|p| !p.is_finite()) {
        return None;
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for change in prices.windows(2).map(|w| w[1] - w[0]) {
        avg_gain += alpha * (change.max(0.0) - avg_gain);
        avg_loss += alpha * ((-change).max(0.0) - avg_loss);
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));

    rsi.is_finite().then_some(rsi)
}
