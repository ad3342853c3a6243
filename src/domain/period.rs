//! Lookback period enumeration.

use crate::domain::error::IndexboardError;
use chrono::{Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookbackPeriod {
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    Max,
}

impl LookbackPeriod {
    pub const ALL: [LookbackPeriod; 5] = [
        LookbackPeriod::OneYear,
        LookbackPeriod::TwoYears,
        LookbackPeriod::FiveYears,
        LookbackPeriod::TenYears,
        LookbackPeriod::Max,
    ];

    /// Provider range token; also the token users type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::TenYears => "10y",
            LookbackPeriod::Max => "max",
        }
    }

    /// Calendar days covered, `None` for the full history.
    pub fn days(&self) -> Option<i64> {
        match self {
            LookbackPeriod::OneYear => Some(365),
            LookbackPeriod::TwoYears => Some(730),
            LookbackPeriod::FiveYears => Some(1826),
            LookbackPeriod::TenYears => Some(3652),
            LookbackPeriod::Max => None,
        }
    }

    /// First date inside the window ending at `end` (inclusive).
    pub fn start_from(&self, end: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|d| end - Duration::days(d))
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackPeriod {
    type Err = IndexboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        LookbackPeriod::ALL
            .iter()
            .find(|p| p.as_str() == token)
            .copied()
            .ok_or_else(|| IndexboardError::InvalidPeriod(s.to_string()))
    }
}
