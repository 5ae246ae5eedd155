//! CSV file mandi price adapter.
//!
//! One file per commodity, `<base>/<commodity>_mandi.csv`. Columns are found by
//! header name (`date`, `mandi`, `district`, `price`, any case and order);
//! extra columns are ignored.

use crate::adapters::csv_adapter::names_with_suffix;
use crate::domain::error::SellcastError;
use crate::domain::mandi::MandiPrice;
use crate::ports::mandi_port::MandiPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const FILE_SUFFIX: &str = "_mandi.csv";

pub struct CsvMandiAdapter {
    base_path: PathBuf,
}

impl CsvMandiAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, commodity: &str) -> PathBuf {
        self.base_path.join(format!("{commodity}{FILE_SUFFIX}"))
    }
}

impl MandiPort for CsvMandiAdapter {
    fn fetch_mandi_prices(&self, commodity: &str) -> Result<Vec<MandiPrice>, SellcastError> {
        let path = self.csv_path(commodity);
        let content = fs::read_to_string(&path).map_err(|e| {
            SellcastError::data(commodity, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| SellcastError::data(commodity, format!("CSV parse error: {e}")))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| SellcastError::data(commodity, format!("missing '{name}' column")))
        };
        let date_col = column("date")?;
        let mandi_col = column("mandi")?;
        let district_col = column("district")?;
        let price_col = column("price")?;

        let mut rows = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            // header is line 1
            let line = row + 2;
            let record = result
                .map_err(|e| SellcastError::data(commodity, format!("CSV parse error: {e}")))?;
            let field = |col: usize, name: &str| {
                record
                    .get(col)
                    .ok_or_else(|| SellcastError::data(commodity, format!("missing {name} on line {line}")))
            };

            let date_str = field(date_col, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SellcastError::data(commodity, format!("invalid date '{date_str}' on line {line}: {e}"))
            })?;
            let price_str = field(price_col, "price")?;
            let price: f64 = price_str.parse().map_err(|_| {
                SellcastError::data(commodity, format!("non-numeric price '{price_str}' on line {line}"))
            })?;

            rows.push(MandiPrice::new(
                date,
                field(mandi_col, "mandi")?,
                field(district_col, "district")?,
                price,
            ));
        }

        tracing::debug!(commodity, rows = rows.len(), path = %path.display(), "read mandi file");
        Ok(rows)
    }

    fn list_commodities(&self) -> Result<Vec<String>, SellcastError> {
        names_with_suffix(&self.base_path, FILE_SUFFIX)
    }
}
