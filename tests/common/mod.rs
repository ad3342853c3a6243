#![allow(dead_code)]

use chrono::NaiveDate;
use indexboard::domain::error::IndexboardError;
pub use indexboard::domain::ohlcv::OhlcvBar;
use indexboard::domain::period::LookbackPeriod;
use indexboard::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory provider that records every call it receives.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, LookbackPeriod)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls_for(&self, ticker: &str) -> usize {
        self.calls.borrow().iter().filter(|(t, _)| t == ticker).count()
    }
}

impl DataPort for MockDataPort {
    fn source_name(&self) -> &str {
        "mock"
    }

    fn fetch_ohlcv(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<Vec<OhlcvBar>, IndexboardError> {
        self.calls.borrow_mut().push((ticker.to_string(), period));
        if let Some(reason) = self.errors.get(ticker) {
            return Err(IndexboardError::fetch_failure(ticker, reason.clone()));
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day starting at `start`, closes taken from `closes`.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

/// Deterministic wavy series: a linear trend with a short cycle on top.
pub fn generate_bars(start: &str, count: usize, start_price: f64, cycle: usize) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| start_price + i as f64 * 0.5 + ((i % cycle) as f64 - cycle as f64 / 2.0))
        .collect();
    bars_from_closes(start, &closes)
}

pub fn write_csv(dir: &std::path::Path, stem: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", stem)), content).unwrap();
}
