//! Validated, memoized access to price series.

use crate::adapters::ttl_cache::TtlCache;
use crate::domain::error::SellcastError;
use crate::domain::price_series::PriceSeries;
use crate::ports::price_port::PricePort;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SERIES_TTL: Duration = Duration::from_secs(300);

pub struct PriceStore {
    port: Arc<dyn PricePort>,
    cache: Arc<TtlCache<String, Arc<PriceSeries>>>,
}

impl PriceStore {
    pub fn new(port: Arc<dyn PricePort>, cache: Arc<TtlCache<String, Arc<PriceSeries>>>) -> Self {
        Self { port, cache }
    }

    pub fn with_ttl(port: Arc<dyn PricePort>, ttl: Duration) -> Self {
        Self::new(port, Arc::new(TtlCache::new(ttl)))
    }

    /// The validated series for `source`. A cached series is returned while
    /// live; otherwise the port is read and the result validated before caching.
    pub fn load(&self, source: &str) -> Result<Arc<PriceSeries>, SellcastError> {
        let key = source.to_string();
        if let Some(series) = self.cache.get(&key) {
            tracing::debug!(source, "series cache hit");
            return Ok(series);
        }

        tracing::debug!(source, "series cache miss");
        let points = self.port.fetch_prices(source)?;
        let series = Arc::new(PriceSeries::new(source, points)?);
        tracing::info!(
            source,
            points = series.len(),
            first = %series.first_date(),
            last = %series.last_date(),
            "loaded price series"
        );
        self.cache.insert(key, Arc::clone(&series));
        Ok(series)
    }

    pub fn invalidate(&self, source: &str) -> bool {
        self.cache.invalidate(&source.to_string())
    }

    pub fn sources(&self) -> Result<Vec<String>, SellcastError> {
        self.port.list_sources()
    }
}
