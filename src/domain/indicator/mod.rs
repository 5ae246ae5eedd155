//! Price-series statistics shared by the trend, projection and simulation stages.
//!
//! Every function works on a plain `&[f64]` slice of prices ordered oldest to
//! newest, so callers can hand in a whole series or a trailing window.

pub mod ema;
pub mod regression;
pub mod roc;
pub mod stddev;

/// The last `n` elements of `values` (all of them if there are fewer).
pub fn trailing(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Arithmetic mean; 0.0 for an empty slice.
///
/// Finite inputs always give a finite mean, even when their sum would
/// overflow.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        sum / n
    } else {
        values.iter().map(|v| v / n).sum()
    }
}

/// Simple moving average over the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> f64 {
    mean(trailing(values, period))
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in [0, 100]. Returns 0.0 for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
