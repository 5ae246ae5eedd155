//! Standard deviation helpers.
//!
//! Population: sqrt(sum((x - mean)^2) / n)
//! Sample:     sqrt(sum((x - mean)^2) / (n - 1)), 0 when n < 2

use super::{mean, trailing};

fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (sum_sq_dev(values) / values.len() as f64).sqrt()
}

pub fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    (sum_sq_dev(values) / (values.len() - 1) as f64).sqrt()
}

/// Sample standard deviation of the trailing `window` values.
pub fn trailing_sample_stddev(values: &[f64], window: usize) -> f64 {
    sample_stddev(trailing(values, window))
}
