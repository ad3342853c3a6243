//! Yahoo Finance data adapter.
//!
//! Queries the chart API with a daily interval and the period token as the
//! range (`1y`, `2y`, `5y`, `10y`, `max`). The connector is async; the adapter
//! owns a current-thread runtime and blocks on each request so callers stay
//! synchronous.

use crate::domain::error::IndexboardError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::LookbackPeriod;
use crate::ports::data_port::DataPort;
use chrono::DateTime;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};
use yahoo_finance_api as yahoo;

const DAILY_INTERVAL: &str = "1d";

pub struct YahooAdapter {
    runtime: Runtime,
    connector: yahoo::YahooConnector,
    timeout: Option<Duration>,
}

impl YahooAdapter {
    /// `timeout` of `None` waits as long as the provider takes.
    pub fn new(timeout: Option<Duration>) -> Result<Self, IndexboardError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            IndexboardError::fetch_failure("*", format!("failed to init Yahoo connector: {}", e))
        })?;
        Ok(Self {
            runtime,
            connector,
            timeout,
        })
    }

    /// `Ok(None)` when the provider does not know the symbol.
    async fn request(
        &self,
        ticker: &str,
        range: &str,
    ) -> Result<Option<yahoo::YResponse>, IndexboardError> {
        let query = self.connector.get_quote_range(ticker, DAILY_INTERVAL, range);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, query).await.map_err(|_| {
                IndexboardError::fetch_failure(
                    ticker,
                    format!("request timed out after {:.1}s", limit.as_secs_f64()),
                )
            })?,
            None => query.await,
        };
        match response {
            Ok(r) => Ok(Some(r)),
            Err(yahoo::YahooError::ApiError(msg)) if is_unknown_symbol(msg.code.as_deref()) => {
                Ok(None)
            }
            Err(e) => Err(IndexboardError::fetch_failure(
                ticker,
                format!("Yahoo API error: {}", e),
            )),
        }
    }
}

/// Chart API error code for a symbol it has never heard of.
fn is_unknown_symbol(code: Option<&str>) -> bool {
    code.is_some_and(|c| c.eq_ignore_ascii_case("not found"))
}

/// Convert a provider timestamp (seconds since epoch, UTC) to a trading day.
fn quote_bar(quote: &yahoo::Quote) -> Option<OhlcvBar> {
    let date = DateTime::from_timestamp(quote.timestamp, 0)?.date_naive();
    Some(OhlcvBar {
        date,
        open: quote.open,
        high: quote.high,
        low: quote.low,
        close: quote.close,
        volume: quote.volume as i64,
    })
}

impl DataPort for YahooAdapter {
    fn source_name(&self) -> &str {
        "yahoo"
    }

    fn fetch_ohlcv(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<Vec<OhlcvBar>, IndexboardError> {
        let Some(response) = self.runtime.block_on(self.request(ticker, period.as_str()))? else {
            info!(ticker, %period, "Yahoo does not know this symbol");
            return Ok(Vec::new());
        };

        // A well-formed reply without quotes means no data for this range.
        let quotes = match response.quotes() {
            Ok(q) => q,
            Err(e) => {
                warn!(ticker, %period, error = %e, "Yahoo returned no usable quotes");
                return Ok(Vec::new());
            }
        };

        let bars: Vec<OhlcvBar> = quotes.iter().filter_map(quote_bar).collect();
        debug!(ticker, %period, quotes = quotes.len(), bars = bars.len(), "Yahoo quotes received");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(timestamp: i64, close: f64) -> yahoo::Quote {
        yahoo::Quote {
            timestamp,
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            volume: 1500,
            close,
            adjclose: close,
        }
    }

    #[test]
    fn not_found_code_means_unknown_symbol() {
        assert!(is_unknown_symbol(Some("Not Found")));
        assert!(is_unknown_symbol(Some("not found")));
        assert!(!is_unknown_symbol(Some("Bad Request")));
        assert!(!is_unknown_symbol(Some("")));
        assert!(!is_unknown_symbol(None));
    }

    #[test]
    fn quote_becomes_utc_trading_day() {
        // 2024-03-15 13:30:00 UTC
        let bar = quote_bar(&quote(1_710_509_400, 22_100.5)).unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(bar.close, 22_100.5);
        assert_eq!(bar.high, 22_102.5);
        assert_eq!(bar.volume, 1500);
    }

    #[test]
    fn out_of_range_timestamp_is_skipped() {
        assert!(quote_bar(&quote(i64::MAX, 1.0)).is_none());
    }
}
