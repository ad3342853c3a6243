//! Core domain types and logic.

pub mod catalog;
pub mod config_validation;
pub mod correlation;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod indicator;
pub mod indicator_helpers;
pub mod ohlcv;
pub mod period;
pub mod series;
