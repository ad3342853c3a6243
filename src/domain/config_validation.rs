//! Configuration validation.
//!
//! Every key is optional; these checks only reject values that are present
//! and unusable, before any fetch runs.

use crate::domain::error::IndexboardError;
use crate::domain::period::LookbackPeriod;
use crate::ports::config_port::ConfigPort;
use std::time::Duration;

pub const DATA_SOURCES: [&str; 2] = ["yahoo", "csv"];
pub const CACHE_POLICIES: [&str; 2] = ["unbounded", "lru"];
pub const ALIGNMENTS: [&str; 2] = ["pairwise", "common"];
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    validate_data_source(config)?;
    validate_timeout(config)?;
    validate_cache(config)?;
    validate_windows(config)?;
    validate_correlation(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> IndexboardError {
    IndexboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_choice(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), IndexboardError> {
    match config.get_string(section, key) {
        Some(v) if !allowed.contains(&v.trim().to_lowercase().as_str()) => Err(invalid(
            section,
            key,
            format!("must be one of {}", allowed.join(", ")),
        )),
        _ => Ok(()),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    validate_choice(config, "data", "source", &DATA_SOURCES)?;
    if let Some(dir) = config.get_string("data", "csv_dir") {
        if dir.trim().is_empty() {
            return Err(invalid("data", "csv_dir", "csv_dir must not be empty"));
        }
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    let value = config.get_double("data", "timeout_secs", 0.0);
    if value < 0.0 || !value.is_finite() {
        return Err(invalid("data", "timeout_secs", "timeout_secs must be non-negative"));
    }
    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|e| invalid("data", "timeout_secs", format!("timeout_secs out of range: {}", e)))
}

fn validate_cache(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    validate_choice(config, "cache", "policy", &CACHE_POLICIES)?;
    let is_lru = config
        .get_string("cache", "policy")
        .is_some_and(|p| p.trim().eq_ignore_ascii_case("lru"));
    if is_lru && config.get_int("cache", "capacity", 16) < 1 {
        return Err(invalid("cache", "capacity", "capacity must be at least 1"));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    let ma_short = config.get_int("indicators", "ma_short", 20);
    let ma_long = config.get_int("indicators", "ma_long", 50);
    let rsi = config.get_int("indicators", "rsi_period", 14);

    for (key, value) in [("ma_short", ma_short), ("ma_long", ma_long), ("rsi_period", rsi)] {
        if value < 1 {
            return Err(invalid("indicators", key, format!("{} must be at least 1", key)));
        }
    }
    if ma_short >= ma_long {
        return Err(invalid(
            "indicators",
            "ma_short",
            "ma_short must be less than ma_long",
        ));
    }
    Ok(())
}

fn validate_correlation(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    if let Some(period) = config.get_string("correlation", "period") {
        period.parse::<LookbackPeriod>().map_err(|_| {
            invalid("correlation", "period", "period must be one of 1y, 2y, 5y, 10y, max")
        })?;
    }
    validate_choice(config, "correlation", "alignment", &ALIGNMENTS)
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), IndexboardError> {
    validate_choice(config, "log", "level", &LOG_LEVELS)
}
