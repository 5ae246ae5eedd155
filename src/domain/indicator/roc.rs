//! Rate of change over a trailing window.
//!
//! ROC(n) = ((P[last] - P[last-n+1]) / P[last-n+1]) * 100
//! The window includes both endpoints, so ROC(7) spans six steps. Windows longer
//! than the series use the first price. A zero base yields 0.

pub fn trailing_roc(prices: &[f64], window: usize) -> f64 {
    if prices.is_empty() || window == 0 {
        return 0.0;
    }
    let last = prices[prices.len() - 1];
    let base = prices[prices.len() - window.min(prices.len())];

    if base == 0.0 {
        0.0
    } else {
        ((last - base) / base) * 100.0
    }
}
