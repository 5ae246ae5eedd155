//! Near-term price projection with confidence bands.
//!
//! The point estimate blends a degree-2 polynomial fitted over the recent
//! window with an EMA extrapolation over the same window:
//!
//! ```text
//! poly     = P(n + N)                       P fitted over the last <=30 prices
//! ema_ext  = E[-1] + (E[-1] - E[-2]) * N    E = EMA(14) over the same window
//! estimate = 0.6 * poly + 0.4 * ema_ext
//! band     = estimate +/- 1.96 * s7 * sqrt(N / 7)
//! ```
//!
//! `s7` is the sample standard deviation of the last 7 prices, so the band is a
//! normal-approximation 95% interval that widens with the square root of the
//! horizon.

use crate::domain::error::{ensure_finite, SellcastError};
use crate::domain::indicator::ema::{ema_series, latest_ema};
use crate::domain::indicator::regression::{linear_slope, polyfit, polyval};
use crate::domain::indicator::stddev::{sample_stddev, trailing_sample_stddev};
use crate::domain::indicator::{sma, trailing};
use crate::domain::price_series::PriceSeries;
use crate::domain::trend::TrendDirection;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub regression_window: usize,
    pub max_degree: usize,
    pub ema_span: usize,
    /// Weight of the polynomial estimate; the EMA extrapolation gets the rest.
    pub poly_weight: f64,
    pub ci_z: f64,
    pub ci_window: usize,
    pub volatility_window: usize,
    /// Regression slope (price units per day) beyond which the trend is directional.
    pub slope_threshold: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            regression_window: 30,
            max_degree: 2,
            ema_span: 14,
            poly_weight: 0.6,
            ci_z: 1.96,
            ci_window: 7,
            volatility_window: 14,
            slope_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceProjection {
    pub days_ahead: u32,
    pub price: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

impl PriceProjection {
    pub fn width(&self) -> f64 {
        self.ci_high - self.ci_low
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProjectionReport {
    pub current_price: f64,
    pub previous_price: f64,
    pub daily_change_pct: f64,
    pub ma_7: f64,
    pub ma_14: f64,
    pub ma_30: f64,
    pub ema_14: f64,
    pub trend_direction: TrendDirection,
    /// OLS slope over the regression window, in price units per day.
    pub trend_strength: f64,
    pub volatility: f64,
    pub projection_7d: PriceProjection,
    pub projection_14d: PriceProjection,
    pub pct_change_7d: f64,
    pub pct_change_14d: f64,
}

/// Projected price net of holding costs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StorageOutlook {
    pub current_price: f64,
    pub projected_price_after_storage: f64,
    pub storage_cost_total: f64,
    pub net_profit_pct: f64,
}

/// Project the price `days_ahead` days past the last observation.
pub fn project_price(
    prices: &[f64],
    days_ahead: u32,
    config: &ProjectionConfig,
) -> Result<PriceProjection, SellcastError> {
    if prices.is_empty() {
        return Err(SellcastError::invalid_input("cannot project an empty series"));
    }
    if config.ema_span == 0 {
        return Err(SellcastError::invalid_input("ema_span must be at least 1"));
    }
    let recent = trailing(prices, config.regression_window.max(1));
    let n = recent.len();
    let horizon = days_ahead as f64;

    let degree = config.max_degree.min(n - 1);
    let coeffs = polyfit(recent, degree).ok_or_else(|| SellcastError::Computation {
        reason: format!("degree-{degree} fit over {n} points is singular"),
    })?;
    let poly_estimate = polyval(&coeffs, n as f64 + horizon);

    let ema = ema_series(recent, config.ema_span);
    let (ema_last, ema_trend) = match ema.as_slice() {
        [.., prev, last] => (*last, last - prev),
        [last] => (*last, 0.0),
        [] => return Err(SellcastError::invalid_input("cannot project an empty series")),
    };
    let ema_estimate = ema_last + ema_trend * horizon;

    let blended = config.poly_weight * poly_estimate + (1.0 - config.poly_weight) * ema_estimate;

    let rolling_std = trailing_sample_stddev(recent, config.ci_window.max(1));
    let half_width = config.ci_z * rolling_std * (horizon / config.ci_window.max(1) as f64).sqrt();

    Ok(PriceProjection {
        days_ahead,
        price: ensure_finite("projected price", blended)?,
        ci_low: ensure_finite("confidence low", blended - half_width)?,
        ci_high: ensure_finite("confidence high", blended + half_width)?,
    })
}

pub fn generate_projection(
    series: &PriceSeries,
    config: &ProjectionConfig,
) -> Result<ProjectionReport, SellcastError> {
    let prices = series.prices();
    let n = prices.len();

    let current_price = series.last_price();
    let previous_price = if n > 1 { prices[n - 2] } else { current_price };
    let daily_change_pct = (current_price - previous_price) / previous_price * 100.0;

    let slope = linear_slope(trailing(&prices, config.regression_window.max(1)));
    let trend_direction = if slope > config.slope_threshold {
        TrendDirection::Rising
    } else if slope < -config.slope_threshold {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    };

    let projection_7d = project_price(&prices, 7, config)?;
    let projection_14d = project_price(&prices, 14, config)?;

    let volatility = sample_stddev(trailing(&prices, config.volatility_window));

    let report = ProjectionReport {
        current_price: ensure_finite("current price", current_price)?,
        previous_price: ensure_finite("previous price", previous_price)?,
        daily_change_pct: ensure_finite("daily change", daily_change_pct)?,
        ma_7: ensure_finite("7-day average", sma(&prices, 7))?,
        ma_14: ensure_finite("14-day average", sma(&prices, 14))?,
        ma_30: ensure_finite("30-day average", sma(&prices, 30))?,
        ema_14: ensure_finite(
            "ema",
            latest_ema(&prices, config.ema_span).unwrap_or(current_price),
        )?,
        trend_direction,
        trend_strength: ensure_finite("trend slope", slope)?,
        volatility: ensure_finite("volatility", volatility)?,
        pct_change_7d: ensure_finite(
            "7-day change",
            (projection_7d.price - current_price) / current_price * 100.0,
        )?,
        pct_change_14d: ensure_finite(
            "14-day change",
            (projection_14d.price - current_price) / current_price * 100.0,
        )?,
        projection_7d,
        projection_14d,
    };

    tracing::debug!(
        source = series.source(),
        points = n,
        slope = report.trend_strength,
        projection_7d = report.projection_7d.price,
        "projection generated"
    );

    Ok(report)
}

/// Holding the crop for `days` costs `cost_per_day` per unit; compare the 7-day
/// projection net of that cost against selling now.
pub fn storage_outlook(
    report: &ProjectionReport,
    days: u32,
    cost_per_day: f64,
) -> Result<StorageOutlook, SellcastError> {
    if !cost_per_day.is_finite() || cost_per_day < 0.0 {
        return Err(SellcastError::invalid_input(
            "storage cost per day must be a non-negative number",
        ));
    }
    let storage_cost_total = cost_per_day * days as f64;
    let adjusted = report.projection_7d.price - storage_cost_total;
    let net_profit_pct = (adjusted - report.current_price) / report.current_price * 100.0;

    Ok(StorageOutlook {
        current_price: report.current_price,
        projected_price_after_storage: ensure_finite("price after storage", adjusted)?,
        storage_cost_total: ensure_finite("storage cost", storage_cost_total)?,
        net_profit_pct: ensure_finite("net profit", net_profit_pct)?,
    })
}
