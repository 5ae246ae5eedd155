//! Monte Carlo sell-timing simulation under geometric Brownian motion.
//!
//! From the trailing log-returns r: mu = mean(r), sigma = std(r). Each path
//! draws D daily shocks from N(mu - sigma^2/2, sigma), so that
//!
//! ```text
//! S_D = S_0 * exp(sum(shocks))      E[S_D] = S_0 * exp(mu * D)
//! ```
//!
//! Paths are independent; only the terminal prices are kept.

use crate::domain::error::{ensure_finite, SellcastError};
use crate::domain::indicator::stddev::population_stddev;
use crate::domain::indicator::{mean, percentile, trailing};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub num_paths: usize,
    pub lookback: usize,
    /// Confidence points per percentage point of `prob_higher` away from 50.
    pub confidence_sensitivity: f64,
    /// Longest horizon accepted, in days.
    pub max_days: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_paths: 500,
            lookback: 60,
            confidence_sensitivity: 0.6,
            max_days: 365,
        }
    }
}

/// GBM parameters estimated from daily log-returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmParams {
    pub drift: f64,
    pub volatility: f64,
}

impl GbmParams {
    pub fn estimate(prices: &[f64], lookback: usize) -> Self {
        let recent = trailing(prices, lookback.max(2));
        let log_returns: Vec<f64> = recent
            .windows(2)
            .map(|w| (w[1] / w[0]).ln())
            .collect();

        Self {
            drift: mean(&log_returns),
            volatility: population_stddev(&log_returns),
        }
    }
}

/// Summary of the terminal-price distribution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TerminalDistribution {
    pub mean: f64,
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
    pub std: f64,
    /// Percentage of paths that end above the starting price.
    pub prob_higher: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulationReport {
    pub current_price: f64,
    pub days: u32,
    pub mean: f64,
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
    pub std: f64,
    pub prob_higher: f64,
    pub pct_change: f64,
    pub price_difference: f64,
    pub base_confidence: f64,
    pub confidence_adjustment: f64,
    pub adjusted_confidence: f64,
    pub recommendation_text: String,
}

/// Terminal prices of `num_paths` GBM paths of `days` steps from `last_price`.
pub fn simulate_terminal_prices<R: Rng>(
    last_price: f64,
    params: GbmParams,
    days: u32,
    num_paths: usize,
    rng: &mut R,
) -> Result<Vec<f64>, SellcastError> {
    let shock = Normal::new(
        params.drift - 0.5 * params.volatility * params.volatility,
        params.volatility,
    )
    .map_err(|e| SellcastError::Computation {
        reason: format!("invalid shock distribution: {e}"),
    })?;

    let finals = (0..num_paths)
        .map(|_| {
            let cumulative: f64 = (0..days).map(|_| shock.sample(rng)).sum();
            last_price * cumulative.exp()
        })
        .collect();
    Ok(finals)
}

pub fn summarize(finals: &[f64], last_price: f64) -> Result<TerminalDistribution, SellcastError> {
    if finals.is_empty() {
        return Err(SellcastError::invalid_input("no simulated paths to summarize"));
    }
    let higher = finals.iter().filter(|&&p| p > last_price).count();

    Ok(TerminalDistribution {
        mean: ensure_finite("simulated mean", mean(finals))?,
        median: ensure_finite("simulated median", percentile(finals, 50.0))?,
        p10: ensure_finite("simulated p10", percentile(finals, 10.0))?,
        p90: ensure_finite("simulated p90", percentile(finals, 90.0))?,
        std: ensure_finite("simulated std", population_stddev(finals))?,
        prob_higher: higher as f64 / finals.len() as f64 * 100.0,
    })
}

/// Run the simulation for a sale `days` from now. `seed` makes the run
/// reproducible; `None` seeds from OS entropy.
pub fn simulate_sell_decision(
    prices: &[f64],
    days: u32,
    base_confidence: f64,
    seed: Option<u64>,
    config: &SimulationConfig,
) -> Result<SimulationReport, SellcastError> {
    if prices.is_empty() {
        return Err(SellcastError::invalid_input("cannot simulate an empty series"));
    }
    if days == 0 {
        return Err(SellcastError::invalid_input("sell_after_days must be at least 1"));
    }
    if days > config.max_days {
        return Err(SellcastError::invalid_input(format!(
            "sell_after_days must be at most {}, got {days}",
            config.max_days
        )));
    }
    if config.num_paths == 0 {
        return Err(SellcastError::invalid_input("num_paths must be at least 1"));
    }
    if !base_confidence.is_finite() {
        return Err(SellcastError::invalid_input("base confidence must be a number"));
    }

    let current_price = prices[prices.len() - 1];
    let params = GbmParams::estimate(prices, config.lookback);

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let finals = simulate_terminal_prices(current_price, params, days, config.num_paths, &mut rng)?;
    let dist = summarize(&finals, current_price)?;

    let pct_change = (dist.mean - current_price) / current_price * 100.0;
    let confidence_adjustment = (dist.prob_higher - 50.0) * config.confidence_sensitivity;
    let adjusted_confidence = (base_confidence + confidence_adjustment).clamp(0.0, 100.0);

    tracing::debug!(
        days,
        paths = config.num_paths,
        drift = params.drift,
        volatility = params.volatility,
        prob_higher = dist.prob_higher,
        "simulation complete"
    );

    Ok(SimulationReport {
        current_price,
        days,
        recommendation_text: recommendation_text(pct_change, dist.prob_higher, days),
        mean: dist.mean,
        median: dist.median,
        p10: dist.p10,
        p90: dist.p90,
        std: dist.std,
        prob_higher: dist.prob_higher,
        pct_change: ensure_finite("simulated change", pct_change)?,
        price_difference: dist.mean - current_price,
        base_confidence,
        confidence_adjustment,
        adjusted_confidence,
    })
}

fn recommendation_text(pct_change: f64, prob_higher: f64, days: u32) -> String {
    if pct_change > 5.0 && prob_higher > 65.0 {
        format!(
            "Waiting {days} days has a {prob_higher:.0}% chance of profit; likely beneficial"
        )
    } else if pct_change > 2.0 && prob_higher > 55.0 {
        format!("Moderate gain expected with {prob_higher:.0}% probability if waiting {days} days")
    } else if pct_change > 0.0 && prob_higher > 50.0 {
        format!("Slight gain possible ({prob_higher:.0}% probability); marginal benefit of waiting")
    } else if prob_higher < 40.0 {
        "Selling now is safer; market shows downward pressure".to_string()
    } else {
        "Market is uncertain; consider selling a portion now".to_string()
    }
}
