//! Market catalog: display names mapped to Yahoo Finance ticker symbols.
//!
//! The catalog is compiled in and never changes at runtime. Each group keeps
//! its entries in display order; display names are unique within a group.

use crate::domain::error::IndexboardError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub ticker: &'static str,
}

const fn entry(name: &'static str, ticker: &'static str) -> CatalogEntry {
    CatalogEntry { name, ticker }
}

pub static WORLD_INDICES: &[CatalogEntry] = &[
    entry("S&P 500 (US)", "^GSPC"),
    entry("NASDAQ (US)", "^IXIC"),
    entry("Dow Jones (US)", "^DJI"),
    entry("FTSE 100 (UK)", "^FTSE"),
    entry("Nikkei 225 (Japan)", "^N225"),
    entry("Hang Seng (Hong Kong)", "^HSI"),
    entry("DAX (Germany)", "^GDAXI"),
    entry("CAC 40 (France)", "^FCHI"),
];

pub static INDIAN_INDICES: &[CatalogEntry] = &[
    entry("NIFTY 50", "^NSEI"),
    entry("SENSEX", "^BSESN"),
    entry("NIFTY BANK", "^NSEBANK"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MarketGroup {
    #[default]
    World,
    Indian,
}

impl MarketGroup {
    pub const ALL: [MarketGroup; 2] = [MarketGroup::World, MarketGroup::Indian];

    pub fn label(&self) -> &'static str {
        match self {
            MarketGroup::World => "World Indices",
            MarketGroup::Indian => "Indian Indices",
        }
    }

    pub fn entries(&self) -> &'static [CatalogEntry] {
        match self {
            MarketGroup::World => WORLD_INDICES,
            MarketGroup::Indian => INDIAN_INDICES,
        }
    }

    pub fn find(&self, name: &str) -> Option<&'static CatalogEntry> {
        self.entries().iter().find(|e| e.name == name)
    }

    /// Resolve a display name, falling back to a case-insensitive match.
    pub fn resolve(&self, name: &str) -> Result<&'static CatalogEntry, IndexboardError> {
        let trimmed = name.trim();
        self.find(trimmed)
            .or_else(|| {
                self.entries()
                    .iter()
                    .find(|e| e.name.eq_ignore_ascii_case(trimmed))
            })
            .ok_or_else(|| IndexboardError::UnknownIndex {
                group: self.label().to_string(),
                name: name.to_string(),
            })
    }
}

impl fmt::Display for MarketGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MarketGroup {
    type Err = IndexboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "world" | "world indices" => Ok(MarketGroup::World),
            "indian" | "india" | "indian indices" => Ok(MarketGroup::Indian),
            _ => Err(IndexboardError::UnknownGroup(s.to_string())),
        }
    }
}
