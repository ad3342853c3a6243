//! Offline CSV data adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` with columns `date,open,high,low,close,volume`.
//! A leading `^` is stripped from index tickers to form the file name, so
//! `^GSPC` lives in `GSPC.csv`. The lookback window ends at the file's last
//! date, mirroring a provider that answers with the most recent history.

use crate::domain::error::IndexboardError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::LookbackPeriod;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, ticker: &str) -> PathBuf {
        let stem = ticker.trim_start_matches('^');
        self.base_path.join(format!("{}.csv", stem))
    }

    /// File stems of every data file in the directory, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, IndexboardError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            IndexboardError::fetch_failure(
                "*",
                format!("failed to read directory {}: {}", self.base_path.display(), e),
            )
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                IndexboardError::fetch_failure("*", format!("directory entry error: {}", e))
            })?;
            let name = entry.file_name();
            if let Some(stem) = name.to_string_lossy().strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

fn parse_date(ticker: &str, raw: &str) -> Result<NaiveDate, IndexboardError> {
    // tolerate timestamps such as "2024-01-02 00:00:00+00:00"
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
        IndexboardError::fetch_failure(ticker, format!("invalid date '{}': {}", raw, e))
    })
}

/// Prices may be blank or "null" on non-trading rows; those become NaN and
/// are dropped when the series is built.
fn parse_price(ticker: &str, column: &str, raw: Option<&str>) -> Result<f64, IndexboardError> {
    let raw = raw
        .ok_or_else(|| IndexboardError::fetch_failure(ticker, format!("missing {} column", column)))?
        .trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|e| {
        IndexboardError::fetch_failure(ticker, format!("invalid {} value '{}': {}", column, raw, e))
    })
}

fn parse_volume(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .and_then(|v| {
            v.parse::<i64>()
                .ok()
                .or_else(|| v.parse::<f64>().ok().map(|f| f as i64))
        })
        .unwrap_or(0)
}

impl DataPort for CsvAdapter {
    fn source_name(&self) -> &str {
        "csv"
    }

    fn fetch_ohlcv(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<Vec<OhlcvBar>, IndexboardError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(IndexboardError::fetch_failure(
                    ticker,
                    format!("failed to read {}: {}", path.display(), e),
                ));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| {
                IndexboardError::fetch_failure(ticker, format!("CSV parse error: {}", e))
            })?;

            let date_str = record
                .get(0)
                .ok_or_else(|| IndexboardError::fetch_failure(ticker, "missing date column"))?;

            bars.push(OhlcvBar {
                date: parse_date(ticker, date_str)?,
                open: parse_price(ticker, "open", record.get(1))?,
                high: parse_price(ticker, "high", record.get(2))?,
                low: parse_price(ticker, "low", record.get(3))?,
                close: parse_price(ticker, "close", record.get(4))?,
                volume: parse_volume(record.get(5)),
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(start) = bars.last().and_then(|b| period.start_from(b.date)) {
            bars.retain(|b| b.date >= start);
        }
        Ok(bars)
    }
}
