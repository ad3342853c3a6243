//! Pairwise Pearson correlation of daily returns across a catalog group.
//!
//! Each entry's return column is keyed by date and pairs are aligned on the
//! dates both sides have a defined return. Entries whose fetch failed or
//! produced no returns stay in the matrix with an undefined row and column.

use crate::domain::catalog::CatalogEntry;
use crate::domain::fetcher::SeriesFetcher;
use crate::domain::indicator::returns::calculate_returns;
use crate::domain::period::LookbackPeriod;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Window used for the correlation heatmap unless configured otherwise.
pub const DEFAULT_CORRELATION_PERIOD: LookbackPeriod = LookbackPeriod::OneYear;

/// How return columns are aligned before correlating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Each pair uses the dates both members share.
    #[default]
    Pairwise,
    /// Every pair uses only the dates shared by all usable entries.
    Common,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MissingReason {
    FetchFailed(String),
    NoData,
    NoReturns,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingReason::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
            MissingReason::NoData => write!(f, "no data"),
            MissingReason::NoReturns => write!(f, "not enough history for returns"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingEntry {
    pub name: String,
    pub reason: MissingReason,
}

/// One named input column: dated returns, or why there are none.
#[derive(Debug, Clone)]
pub struct ReturnColumn {
    pub name: String,
    pub returns: Result<BTreeMap<NaiveDate, f64>, MissingReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    cells: Vec<Option<f64>>,
    overlaps: Vec<usize>,
    missing: Vec<MissingEntry>,
}

impl CorrelationMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let n = self.size();
        if row >= n || col >= n {
            return None;
        }
        self.cells[row * n + col]
    }

    /// Number of aligned observations behind cell `(row, col)`.
    pub fn overlap(&self, row: usize, col: usize) -> usize {
        let n = self.size();
        if row >= n || col >= n {
            return 0;
        }
        self.overlaps[row * n + col]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get_by_name(&self, row: &str, col: &str) -> Option<f64> {
        self.get(self.index_of(row)?, self.index_of(col)?)
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        let n = self.size();
        &self.cells[row * n..(row + 1) * n]
    }

    pub fn missing(&self) -> &[MissingEntry] {
        &self.missing
    }

    /// True when at least one entry could not be correlated.
    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Pearson correlation of two equally long samples, clamped to [-1, 1].
/// `None` with fewer than two points, a zero-variance side, or a
/// non-finite result.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut numer = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        numer += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x == 0.0 || denom_y == 0.0 {
        return None;
    }

    let correlation = numer / (denom_x.sqrt() * denom_y.sqrt());
    correlation
        .is_finite()
        .then(|| correlation.clamp(-1.0, 1.0))
}

fn aligned_pair(
    a: &BTreeMap<NaiveDate, f64>,
    b: &BTreeMap<NaiveDate, f64>,
    allowed: Option<&BTreeSet<NaiveDate>>,
) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (date, &va) in a {
        if allowed.is_some_and(|set| !set.contains(date)) {
            continue;
        }
        if let Some(&vb) = b.get(date) {
            x.push(va);
            y.push(vb);
        }
    }
    (x, y)
}

/// Build the matrix from already computed return columns.
pub fn correlate_returns(columns: &[ReturnColumn], alignment: Alignment) -> CorrelationMatrix {
    let n = columns.len();
    let mut cells = vec![None; n * n];
    let mut overlaps = vec![0; n * n];
    let mut missing = Vec::new();

    let usable: Vec<Option<&BTreeMap<NaiveDate, f64>>> = columns
        .iter()
        .map(|c| match &c.returns {
            Ok(map) if !map.is_empty() => Some(map),
            Ok(_) => {
                missing.push(MissingEntry {
                    name: c.name.clone(),
                    reason: MissingReason::NoReturns,
                });
                None
            }
            Err(reason) => {
                missing.push(MissingEntry {
                    name: c.name.clone(),
                    reason: reason.clone(),
                });
                None
            }
        })
        .collect();

    let common: Option<BTreeSet<NaiveDate>> = match alignment {
        Alignment::Pairwise => None,
        Alignment::Common => {
            let mut maps = usable.iter().flatten();
            maps.next().map(|first| {
                let mut dates: BTreeSet<NaiveDate> = first.keys().copied().collect();
                for map in maps {
                    dates.retain(|d| map.contains_key(d));
                }
                dates
            })
        }
    };

    for i in 0..n {
        let Some(a) = usable[i] else { continue };
        cells[i * n + i] = Some(1.0);
        overlaps[i * n + i] = match &common {
            Some(dates) => dates.len(),
            None => a.len(),
        };

        for j in (i + 1)..n {
            let Some(b) = usable[j] else { continue };
            let (x, y) = aligned_pair(a, b, common.as_ref());
            let value = pearson(&x, &y);
            cells[i * n + j] = value;
            cells[j * n + i] = value;
            overlaps[i * n + j] = x.len();
            overlaps[j * n + i] = x.len();
        }
    }

    CorrelationMatrix {
        names: columns.iter().map(|c| c.name.clone()).collect(),
        cells,
        overlaps,
        missing,
    }
}

/// Fetch every entry's series for `period` through the shared cache and
/// correlate their daily returns.
pub fn correlate<P: DataPort>(
    fetcher: &mut SeriesFetcher<P>,
    entries: &[CatalogEntry],
    period: LookbackPeriod,
    alignment: Alignment,
) -> CorrelationMatrix {
    let columns: Vec<ReturnColumn> = entries
        .iter()
        .map(|entry| {
            let returns = match fetcher.fetch(entry.ticker, period) {
                Ok(series) if series.is_empty() => {
                    warn!(name = entry.name, ticker = entry.ticker, "no data, leaving out of correlation");
                    Err(MissingReason::NoData)
                }
                Ok(series) => Ok(calculate_returns(series.bars())
                    .values
                    .iter()
                    .filter(|p| p.valid)
                    .map(|p| (p.date, p.value))
                    .collect()),
                Err(e) => {
                    warn!(name = entry.name, ticker = entry.ticker, error = %e, "leaving out of correlation");
                    Err(MissingReason::FetchFailed(e.to_string()))
                }
            };
            ReturnColumn {
                name: entry.name.to_string(),
                returns,
            }
        })
        .collect();

    let matrix = correlate_returns(&columns, alignment);
    debug!(
        entries = matrix.size(),
        missing = matrix.missing().len(),
        %period,
        "correlation matrix built"
    );
    matrix
}
