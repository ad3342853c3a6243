//! Domain error types.
//!
//! Only conditions that stop a request are errors. Empty results, indicator
//! warmup gaps and partial correlation matrices are reported as
//! [`Notice`](crate::domain::dashboard::Notice)s instead.

/// Top-level error type for indexboard.
#[derive(Debug, thiserror::Error)]
pub enum IndexboardError {
    #[error("failed to fetch {ticker}: {reason}")]
    FetchFailure { ticker: String, reason: String },

    #[error("ticker symbol must not be empty")]
    InvalidTicker,

    #[error("invalid period '{0}' (expected one of 1y, 2y, 5y, 10y, max)")]
    InvalidPeriod(String),

    #[error("invalid market group '{0}' (expected world or indian)")]
    UnknownGroup(String),

    #[error("no index named '{name}' in {group}")]
    UnknownIndex { group: String, name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IndexboardError {
    pub fn fetch_failure(ticker: &str, reason: impl Into<String>) -> Self {
        IndexboardError::FetchFailure {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&IndexboardError> for std::process::ExitCode {
    fn from(err: &IndexboardError) -> Self {
        let code: u8 = match err {
            IndexboardError::Io(_) | IndexboardError::Report { .. } => 1,
            IndexboardError::InvalidTicker
            | IndexboardError::InvalidPeriod(_)
            | IndexboardError::UnknownGroup(_)
            | IndexboardError::UnknownIndex { .. }
            | IndexboardError::ConfigParse { .. }
            | IndexboardError::ConfigInvalid { .. } => 2,
            IndexboardError::FetchFailure { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
