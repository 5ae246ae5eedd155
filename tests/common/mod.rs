#![allow(dead_code)]

use chrono::NaiveDate;
use sellcast::adapters::ttl_cache::Clock;
use sellcast::domain::error::SellcastError;
pub use sellcast::domain::price_series::PricePoint;
use sellcast::ports::price_port::PricePort;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_points(mut self, source: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(source.to_string(), points);
        self
    }

    pub fn with_prices(self, source: &str, prices: &[f64]) -> Self {
        self.with_points(source, points_from("2026-01-01", prices))
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(&self, source: &str) -> Result<Vec<PricePoint>, SellcastError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(source) {
            return Err(SellcastError::data(source, reason.clone()));
        }
        Ok(self.data.get(source).cloned().unwrap_or_default())
    }

    fn list_sources(&self) -> Result<Vec<String>, SellcastError> {
        let mut sources: Vec<String> = self.data.keys().cloned().collect();
        sources.sort();
        Ok(sources)
    }
}

/// Clock for expiry tests; only moves on `advance`.
pub struct StepClock {
    now: Mutex<Instant>,
}

impl StepClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points starting at `start_date`.
pub fn points_from(start_date: &str, prices: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(start + chrono::Duration::days(i as i64), p))
        .collect()
}

pub fn ramp(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

pub fn geometric(start: f64, rate: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start * (1.0 + rate).powi(i as i32)).collect()
}

/// `date,price` CSV body for a price file.
pub fn price_csv(start_date: &str, prices: &[f64]) -> String {
    let mut out = String::from("date,price\n");
    for p in points_from(start_date, prices) {
        out.push_str(&format!("{},{}\n", p.date.format("%Y-%m-%d"), p.price));
    }
    out
}

/// `date,mandi,district,price` CSV body; each mandi gets consecutive daily
/// rows from `start_date`.
pub fn mandi_csv(start_date: &str, mandis: &[(&str, &str, &[f64])]) -> String {
    let mut out = String::from("date,mandi,district,price\n");
    for (mandi, district, prices) in mandis {
        for p in points_from(start_date, prices) {
            out.push_str(&format!("{},{},{},{}\n", p.date.format("%Y-%m-%d"), mandi, district, p.price));
        }
    }
    out
}
