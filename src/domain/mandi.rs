//! Cross-mandi price comparison for one commodity.
//!
//! The latest prices are the rows on the most recent date in the board. A
//! mandi's trend compares the mean of its last 7 rows with the mean of the 7
//! before them, or with its whole history when it has fewer than 14 rows. A
//! move of more than 1% either way is a trend.

use crate::adapters::ttl_cache::TtlCache;
use crate::domain::error::{ensure_finite, SellcastError};
use crate::domain::fair_price::{fair_price, FairPrice, MspTable};
use crate::domain::indicator::mean;
use crate::domain::trend::TrendDirection;
use crate::ports::mandi_port::MandiPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const TREND_WINDOW: usize = 7;
const TREND_BAND_PCT: f64 = 1.0;

/// One market's price for a commodity on one day.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MandiPrice {
    pub date: NaiveDate,
    pub mandi: String,
    pub district: String,
    pub price: f64,
}

impl MandiPrice {
    pub fn new(date: NaiveDate, mandi: &str, district: &str, price: f64) -> Self {
        Self {
            date,
            mandi: mandi.to_string(),
            district: district.to_string(),
            price,
        }
    }
}

/// Validated mandi rows for one commodity. Never empty; every price is
/// finite and positive. Rows may arrive in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct MandiBoard {
    commodity: String,
    rows: Vec<MandiPrice>,
    latest_date: NaiveDate,
}

impl MandiBoard {
    pub fn new(commodity: &str, rows: Vec<MandiPrice>) -> Result<Self, SellcastError> {
        let Some(latest_date) = rows.iter().map(|r| r.date).max() else {
            return Err(SellcastError::data(commodity, "mandi table is empty"));
        };
        for row in &rows {
            if row.mandi.trim().is_empty() {
                return Err(SellcastError::data(
                    commodity,
                    format!("blank mandi name on {}", row.date),
                ));
            }
            if !row.price.is_finite() || row.price <= 0.0 {
                return Err(SellcastError::data(
                    commodity,
                    format!("invalid price {} for {} on {}", row.price, row.mandi, row.date),
                ));
            }
        }
        Ok(Self {
            commodity: commodity.to_string(),
            rows,
            latest_date,
        })
    }

    pub fn commodity(&self) -> &str {
        &self.commodity
    }

    pub fn rows(&self) -> &[MandiPrice] {
        &self.rows
    }

    pub fn latest_date(&self) -> NaiveDate {
        self.latest_date
    }

    /// Rows on the most recent date, in board order.
    pub fn latest_prices(&self) -> Vec<&MandiPrice> {
        self.rows.iter().filter(|r| r.date == self.latest_date).collect()
    }

    /// Seven-row trend for `mandi`. Fewer than 7 rows is `InsufficientData`,
    /// as is a mandi the board does not list.
    pub fn mandi_trend(&self, mandi: &str) -> Result<TrendDirection, SellcastError> {
        let mut history: Vec<&MandiPrice> = self.rows.iter().filter(|r| r.mandi == mandi).collect();
        if history.len() < TREND_WINDOW {
            return Ok(TrendDirection::InsufficientData);
        }
        history.sort_by_key(|r| r.date);
        let prices: Vec<f64> = history.iter().map(|r| r.price).collect();
        let n = prices.len();

        let recent = mean(&prices[n - TREND_WINDOW..]);
        let prior = if n >= 2 * TREND_WINDOW {
            mean(&prices[n - 2 * TREND_WINDOW..n - TREND_WINDOW])
        } else {
            mean(&prices)
        };
        let diff_pct = ensure_finite("mandi trend", (recent - prior) / prior * 100.0)?;

        Ok(if diff_pct > TREND_BAND_PCT {
            TrendDirection::Rising
        } else if diff_pct < -TREND_BAND_PCT {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MandiQuote {
    pub mandi: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MandiComparison {
    pub commodity: String,
    pub as_of: NaiveDate,
    pub district: String,
    /// Price at the first latest row in the farmer's district.
    pub local_price: Option<f64>,
    /// Mean of the latest prices across every mandi.
    pub district_average: f64,
    /// Mean of every row in the board.
    pub historical_average: f64,
    pub best: MandiQuote,
    pub worst: MandiQuote,
    pub msp: f64,
    pub is_above_msp: Option<bool>,
    pub mandi_trends: BTreeMap<String, TrendDirection>,
    pub fair_price: Option<FairPrice>,
}

/// Compare today's mandi prices for a farmer in `district`. District names
/// match case-insensitively; ties for best or worst go to the earlier row.
pub fn compare_mandis(
    board: &MandiBoard,
    district: &str,
    msp: f64,
) -> Result<MandiComparison, SellcastError> {
    let latest = board.latest_prices();
    let mut best = latest[0];
    let mut worst = latest[0];
    for &row in &latest[1..] {
        if row.price > best.price {
            best = row;
        }
        if row.price < worst.price {
            worst = row;
        }
    }

    let latest_prices: Vec<f64> = latest.iter().map(|r| r.price).collect();
    let all_prices: Vec<f64> = board.rows().iter().map(|r| r.price).collect();
    let district_average = ensure_finite("district average", mean(&latest_prices))?;
    let historical_average = ensure_finite("historical average", mean(&all_prices))?;

    let wanted = district.trim();
    let local_price = latest
        .iter()
        .find(|r| r.district.trim().eq_ignore_ascii_case(wanted))
        .map(|r| r.price);

    let mut mandi_trends = BTreeMap::new();
    for row in &latest {
        if !mandi_trends.contains_key(&row.mandi) {
            mandi_trends.insert(row.mandi.clone(), board.mandi_trend(&row.mandi)?);
        }
    }

    let fair_price = local_price
        .map(|price| fair_price(price, historical_average, msp))
        .transpose()?;

    Ok(MandiComparison {
        commodity: board.commodity().to_string(),
        as_of: board.latest_date(),
        district: wanted.to_string(),
        local_price,
        district_average,
        historical_average,
        best: MandiQuote {
            mandi: best.mandi.clone(),
            price: best.price,
        },
        worst: MandiQuote {
            mandi: worst.mandi.clone(),
            price: worst.price,
        },
        msp,
        is_above_msp: local_price.map(|price| price >= msp),
        mandi_trends,
        fair_price,
    })
}

/// Validated, memoized access to mandi boards, plus the MSP table used to
/// judge them.
pub struct MandiStore {
    port: Arc<dyn MandiPort>,
    cache: TtlCache<String, Arc<MandiBoard>>,
    msp: MspTable,
}

impl MandiStore {
    pub fn new(port: Arc<dyn MandiPort>, ttl: Duration, msp: MspTable) -> Self {
        Self::with_cache(port, TtlCache::new(ttl), msp)
    }

    pub fn with_cache(
        port: Arc<dyn MandiPort>,
        cache: TtlCache<String, Arc<MandiBoard>>,
        msp: MspTable,
    ) -> Self {
        Self { port, cache, msp }
    }

    pub fn load(&self, commodity: &str) -> Result<Arc<MandiBoard>, SellcastError> {
        self.cache.get_or_try_insert_with(commodity.to_string(), || {
            let rows = self.port.fetch_mandi_prices(commodity)?;
            let board = MandiBoard::new(commodity, rows)?;
            tracing::info!(
                commodity,
                rows = board.rows().len(),
                latest = %board.latest_date(),
                "loaded mandi prices"
            );
            Ok(Arc::new(board))
        })
    }

    /// Comparison for `commodity`, judged against the MSP of `crop`.
    pub fn compare(
        &self,
        commodity: &str,
        district: &str,
        crop: &str,
    ) -> Result<MandiComparison, SellcastError> {
        let board = self.load(commodity)?;
        compare_mandis(&board, district, self.msp.msp_for(crop))
    }

    pub fn invalidate(&self, commodity: &str) -> bool {
        self.cache.invalidate(&commodity.to_string())
    }

    pub fn commodities(&self) -> Result<Vec<String>, SellcastError> {
        self.port.list_commodities()
    }
}
