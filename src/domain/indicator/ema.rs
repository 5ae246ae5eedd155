//! Exponential Moving Average.
//!
//! k = 2/(span+1), EMA[0] = P[0], then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Seeding with the first price means there is no warmup: every point is valid.

/// Full EMA series for `prices`. Empty input or a zero span yields an empty series.
pub fn ema_series(prices: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || prices.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len());
    let mut ema = prices[0];
    values.push(ema);

    for &price in &prices[1..] {
        ema = price * k + ema * (1.0 - k);
        values.push(ema);
    }

    values
}

/// Latest EMA value, or `None` when the series is empty.
pub fn latest_ema(prices: &[f64], span: usize) -> Option<f64> {
    ema_series(prices, span).last().copied()
}
