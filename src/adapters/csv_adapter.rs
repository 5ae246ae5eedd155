//! CSV file price adapter.
//!
//! One file per source, `<base>/<source>_prices.csv`, with a `date,price`
//! header and `YYYY-MM-DD` dates.

use crate::domain::error::SellcastError;
use crate::domain::price_series::PricePoint;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_SUFFIX: &str = "_prices.csv";

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(format!("{source}{FILE_SUFFIX}"))
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(&self, source: &str) -> Result<Vec<PricePoint>, SellcastError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path).map_err(|e| {
            SellcastError::data(source, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut points = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            // header is line 1
            let line = row + 2;
            let record = result
                .map_err(|e| SellcastError::data(source, format!("CSV parse error: {e}")))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| SellcastError::data(source, format!("missing date column on line {line}")))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SellcastError::data(source, format!("invalid date '{date_str}' on line {line}: {e}"))
            })?;

            let price_str = record
                .get(1)
                .ok_or_else(|| SellcastError::data(source, format!("missing price column on line {line}")))?;
            let price: f64 = price_str.parse().map_err(|_| {
                SellcastError::data(source, format!("non-numeric price '{price_str}' on {date}"))
            })?;

            points.push(PricePoint::new(date, price));
        }

        tracing::debug!(source, rows = points.len(), path = %path.display(), "read price file");
        Ok(points)
    }

    fn list_sources(&self) -> Result<Vec<String>, SellcastError> {
        names_with_suffix(&self.base_path, FILE_SUFFIX)
    }
}

/// Sorted stems of the files in `dir` whose names end in `suffix`.
pub(crate) fn names_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<String>, SellcastError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if let Some(stem) = name.strip_suffix(suffix) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}
