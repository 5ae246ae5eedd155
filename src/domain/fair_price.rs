//! Current price against the historical average and the Minimum Support Price.

use crate::domain::error::{ensure_finite, SellcastError};
use std::collections::BTreeMap;

/// Rs/quintal.
pub const DEFAULT_MSP: [(&str, f64); 5] = [
    ("wheat", 2275.0),
    ("rice", 2320.0),
    ("maize", 2090.0),
    ("cotton", 7121.0),
    ("sugarcane", 340.0),
];

const FALLBACK_CROP: &str = "wheat";

#[derive(Debug, Clone, PartialEq)]
pub struct MspTable {
    prices: BTreeMap<String, f64>,
}

impl Default for MspTable {
    fn default() -> Self {
        Self {
            prices: DEFAULT_MSP
                .iter()
                .map(|(crop, price)| (crop.to_string(), *price))
                .collect(),
        }
    }
}

impl MspTable {
    pub fn set(&mut self, crop: &str, price: f64) {
        self.prices.insert(crop.trim().to_lowercase(), price);
    }

    pub fn crops(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(c, p)| (c.as_str(), *p))
    }

    /// Unknown crops use the wheat price.
    pub fn msp_for(&self, crop: &str) -> f64 {
        self.prices
            .get(&crop.trim().to_lowercase())
            .or_else(|| self.prices.get(FALLBACK_CROP))
            .copied()
            .unwrap_or(DEFAULT_MSP[0].1)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FairPrice {
    pub current_price: f64,
    pub historical_avg: f64,
    pub msp: f64,
    pub vs_average_pct: f64,
    pub vs_msp_pct: f64,
    pub is_above_msp: bool,
}

pub fn fair_price(current: f64, historical_avg: f64, msp: f64) -> Result<FairPrice, SellcastError> {
    for (name, value) in [("current price", current), ("historical average", historical_avg), ("MSP", msp)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(SellcastError::invalid_input(format!(
                "{name} must be positive, got {value}"
            )));
        }
    }

    Ok(FairPrice {
        current_price: current,
        historical_avg,
        msp,
        vs_average_pct: ensure_finite("vs_average_pct", (current - historical_avg) / historical_avg * 100.0)?,
        vs_msp_pct: ensure_finite("vs_msp_pct", (current - msp) / msp * 100.0)?,
        is_above_msp: current >= msp,
    })
}
