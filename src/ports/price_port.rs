//! Price history source port.

use crate::domain::error::SellcastError;
use crate::domain::price_series::PricePoint;

pub trait PricePort: Send + Sync {
    /// Raw points for `source` in the order the source holds them. Validation
    /// happens in the store, not here.
    fn fetch_prices(&self, source: &str) -> Result<Vec<PricePoint>, SellcastError>;

    fn list_sources(&self) -> Result<Vec<String>, SellcastError>;
}
