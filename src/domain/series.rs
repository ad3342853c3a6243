//! Ordered daily price series for a single ticker.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::LookbackPeriod;
use chrono::NaiveDate;

/// Bars strictly increasing by date, no duplicate dates, finite closes.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSeries {
    pub ticker: String,
    pub period: LookbackPeriod,
    bars: Vec<OhlcvBar>,
}

impl TickerSeries {
    /// Normalise raw provider rows: sort by date, keep the last row seen for
    /// a duplicated date, drop rows with a non-finite close.
    pub fn from_bars(ticker: &str, period: LookbackPeriod, mut bars: Vec<OhlcvBar>) -> Self {
        bars.retain(|b| b.close.is_finite());
        // stable sort keeps provider order within a date
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker: ticker.to_string(),
            period,
            bars: deduped,
        }
    }

    pub fn empty(ticker: &str, period: LookbackPeriod) -> Self {
        Self {
            ticker: ticker.to_string(),
            period,
            bars: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}
