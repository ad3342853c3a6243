//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values aligned with its bars
//!
//! Every calculation returns one point per input bar. Points that have no
//! value yet (window warmup, division by zero) carry `valid == false`.

pub mod drawdown;
pub mod returns;
pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn defined(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }

    pub fn undefined(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Returns,
    Peak,
    Drawdown,
}

impl IndicatorType {
    /// Number of leading points that are undefined by construction.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period) => period.saturating_sub(1),
            IndicatorType::Rsi(period) => *period,
            IndicatorType::Returns => 1,
            IndicatorType::Peak | IndicatorType::Drawdown => 0,
        }
    }

    /// Bars needed before the first defined value appears.
    pub fn min_bars(&self) -> usize {
        match self {
            IndicatorType::Sma(period) => *period,
            _ => self.warmup() + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::get)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.valid).count()
    }

    pub fn has_values(&self) -> bool {
        self.values.iter().any(|p| p.valid)
    }

    /// Most recent defined value.
    pub fn latest(&self) -> Option<f64> {
        self.values.iter().rev().find_map(IndicatorPoint::get)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "MA{}", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Returns => write!(f, "Returns"),
            IndicatorType::Peak => write!(f, "Peak"),
            IndicatorType::Drawdown => write!(f, "Drawdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "MA20");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Drawdown.to_string(), "Drawdown");
    }

    #[test]
    fn warmup_lengths() {
        assert_eq!(IndicatorType::Sma(20).warmup(), 19);
        assert_eq!(IndicatorType::Sma(20).min_bars(), 20);
        assert_eq!(IndicatorType::Rsi(14).warmup(), 14);
        assert_eq!(IndicatorType::Rsi(14).min_bars(), 15);
        assert_eq!(IndicatorType::Returns.min_bars(), 2);
        assert_eq!(IndicatorType::Drawdown.min_bars(), 1);
        assert_eq!(IndicatorType::Sma(0).warmup(), 0);
    }

    #[test]
    fn point_get_respects_validity() {
        assert_eq!(IndicatorPoint::defined(d(1), 3.5).get(), Some(3.5));
        assert_eq!(IndicatorPoint::undefined(d(1)).get(), None);
    }

    #[test]
    fn series_latest_skips_undefined_tail() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Returns,
            values: vec![
                IndicatorPoint::undefined(d(1)),
                IndicatorPoint::defined(d(2), 0.1),
                IndicatorPoint::undefined(d(3)),
            ],
        };
        assert_eq!(series.latest(), Some(0.1));
        assert_eq!(series.defined_count(), 1);
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), Some(0.1));
        assert_eq!(series.get(9), None);
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "ma20");
        map.insert(IndicatorType::Sma(50), "ma50");
        map.insert(IndicatorType::Rsi(14), "rsi");

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"ma20"));
        assert_eq!(map.get(&IndicatorType::Sma(50)), Some(&"ma50"));
        assert_eq!(map.get(&IndicatorType::Rsi(14)), Some(&"rsi"));
        assert_eq!(map.get(&IndicatorType::Drawdown), None);
    }
}
