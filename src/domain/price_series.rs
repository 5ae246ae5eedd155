//! Validated daily price series.

use crate::domain::error::SellcastError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Strictly date-ascending series of finite, positive prices. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    source: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validates `points` as delivered; unordered input is rejected, not sorted.
    pub fn new(source: &str, points: Vec<PricePoint>) -> Result<Self, SellcastError> {
        if points.is_empty() {
            return Err(SellcastError::data(source, "price series is empty"));
        }

        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() {
                return Err(SellcastError::data(
                    source,
                    format!("non-numeric price on {}", point.date),
                ));
            }
            if point.price <= 0.0 {
                return Err(SellcastError::data(
                    source,
                    format!("non-positive price {} on {}", point.price, point.date),
                ));
            }
            if i > 0 {
                let prev = points[i - 1].date;
                if point.date == prev {
                    return Err(SellcastError::data(
                        source,
                        format!("duplicate date {}", point.date),
                    ));
                }
                if point.date < prev {
                    return Err(SellcastError::data(
                        source,
                        format!("dates out of order: {} follows {}", point.date, prev),
                    ));
                }
            }
        }

        Ok(Self {
            source: source.to_string(),
            points,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_price(&self) -> f64 {
        self.points[self.points.len() - 1].price
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}
