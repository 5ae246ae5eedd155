//! Sell-now / hold split derived from the sell-confidence score.

use std::fmt;

/// One score band: scores at or above `min_score` sell `sell_now_pct` now.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyBand {
    pub min_score: f64,
    pub sell_now_pct: u8,
    pub reason: String,
}

impl StrategyBand {
    pub fn new(min_score: f64, sell_now_pct: u8, reason: &str) -> Self {
        Self {
            min_score,
            sell_now_pct: sell_now_pct.min(100),
            reason: reason.to_string(),
        }
    }
}

/// Bands ordered from highest `min_score` down, plus the split used when no
/// band matches.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPolicy {
    pub bands: Vec<StrategyBand>,
    pub fallback: StrategyBand,
}

impl Default for StrategyPolicy {
    fn default() -> Self {
        Self {
            bands: vec![
                StrategyBand::new(80.0, 80, "Strong market confidence"),
                StrategyBand::new(60.0, 50, "Moderate opportunity, balance risk"),
                StrategyBand::new(40.0, 30, "Uncertain market, cautious selling"),
            ],
            fallback: StrategyBand::new(0.0, 10, "High risk, hold majority"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrategyPlan {
    pub sell_now_pct: u8,
    pub hold_pct: u8,
    pub reason: String,
}

impl fmt::Display for StrategyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sell {}% now, hold {}% ({})",
            self.sell_now_pct, self.hold_pct, self.reason
        )
    }
}

pub fn plan_for_score(score: f64, policy: &StrategyPolicy) -> StrategyPlan {
    let band = policy
        .bands
        .iter()
        .find(|b| score >= b.min_score)
        .unwrap_or(&policy.fallback);

    let sell_now_pct = band.sell_now_pct.min(100);
    StrategyPlan {
        sell_now_pct,
        hold_pct: 100 - sell_now_pct,
        reason: band.reason.clone(),
    }
}
