//! Short-term trend classification from an EMA crossover plus momentum.
//!
//! strength = (EMA(fast)[-1] - EMA(slow)[-1]) / P[-1] * 100, banded into
//! rising/falling/stable with a "strong" sub-band. Spans are capped at
//! `len - 1` so short series still produce a signal.

use crate::domain::error::{ensure_finite, SellcastError};
use crate::domain::indicator::ema::ema_series;
use crate::domain::indicator::roc::trailing_roc;
use crate::domain::indicator::sma;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
    InsufficientData,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    pub fast_span: usize,
    pub slow_span: usize,
    pub min_points: usize,
    /// |strength| above this is a trend, at or below it the market is stable.
    pub trend_band: f64,
    /// |strength| above this is a strong trend.
    pub strong_band: f64,
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            fast_span: 12,
            slow_span: 26,
            min_points: 14,
            trend_band: 0.3,
            strong_band: 1.0,
            short_window: 7,
            long_window: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrendReport {
    pub direction: TrendDirection,
    /// Signed EMA spread as a percentage of the current price.
    pub strength: f64,
    pub momentum_7d: f64,
    pub momentum_14d: f64,
    pub short_avg: f64,
    pub long_avg: f64,
    pub ema_signal: f64,
    pub strong: bool,
    pub advice: String,
}

impl TrendReport {
    fn insufficient() -> Self {
        Self {
            direction: TrendDirection::InsufficientData,
            strength: 0.0,
            momentum_7d: 0.0,
            momentum_14d: 0.0,
            short_avg: 0.0,
            long_avg: 0.0,
            ema_signal: 0.0,
            strong: false,
            advice: "Not enough market data to determine trend.".to_string(),
        }
    }
}

/// Classify the trend of `prices`.
///
/// Too little history is not an error: it yields an `InsufficientData`
/// report. A non-finite statistic is a `Computation` error.
pub fn analyze_trend(prices: &[f64], config: &TrendConfig) -> Result<TrendReport, SellcastError> {
    if prices.len() < config.min_points.max(2) {
        tracing::debug!(
            points = prices.len(),
            required = config.min_points,
            "trend: insufficient history"
        );
        return Ok(TrendReport::insufficient());
    }

    let cap = prices.len() - 1;
    let fast = ema_series(prices, config.fast_span.min(cap));
    let slow = ema_series(prices, config.slow_span.min(cap));
    let (Some(&fast_last), Some(&slow_last)) = (fast.last(), slow.last()) else {
        return Ok(TrendReport::insufficient());
    };

    let signal = ensure_finite("ema_signal", fast_last - slow_last)?;
    let current = prices[prices.len() - 1];
    let strength = if current > 0.0 {
        ensure_finite("trend strength", signal / current * 100.0)?
    } else {
        0.0
    };

    let (direction, strong) = classify(strength, config);

    Ok(TrendReport {
        direction,
        strength,
        momentum_7d: ensure_finite("momentum_7d", trailing_roc(prices, 7))?,
        momentum_14d: ensure_finite("momentum_14d", trailing_roc(prices, 14))?,
        short_avg: ensure_finite("short_avg", sma(prices, config.short_window))?,
        long_avg: ensure_finite("long_avg", sma(prices, config.long_window))?,
        ema_signal: signal,
        strong,
        advice: advice_for(direction, strong).to_string(),
    })
}

fn classify(strength: f64, config: &TrendConfig) -> (TrendDirection, bool) {
    if strength > config.trend_band {
        (TrendDirection::Rising, strength > config.strong_band)
    } else if strength < -config.trend_band {
        (TrendDirection::Falling, strength < -config.strong_band)
    } else {
        (TrendDirection::Stable, false)
    }
}

fn advice_for(direction: TrendDirection, strong: bool) -> &'static str {
    match (direction, strong) {
        (TrendDirection::Rising, true) => {
            "Strong upward momentum. Prices are rising significantly; you may want to wait for the peak before selling."
        }
        (TrendDirection::Rising, false) => {
            "Market prices are trending upward. Consider timing your sale carefully."
        }
        (TrendDirection::Falling, true) => {
            "Strong downward pressure. Selling sooner may protect against further losses."
        }
        (TrendDirection::Falling, false) => "Market prices are declining. Selling soon may reduce risk.",
        (TrendDirection::Stable, _) => "Market prices are stable. Selling now is reasonable.",
        (TrendDirection::InsufficientData, _) => "Not enough market data to determine trend.",
    }
}
