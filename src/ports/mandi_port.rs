//! Per-mandi price source port.

use crate::domain::error::SellcastError;
use crate::domain::mandi::MandiPrice;

pub trait MandiPort: Send + Sync {
    /// Every row held for `commodity`, across all mandis and dates.
    fn fetch_mandi_prices(&self, commodity: &str) -> Result<Vec<MandiPrice>, SellcastError>;

    fn list_commodities(&self) -> Result<Vec<String>, SellcastError>;
}
