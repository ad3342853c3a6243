//! Price data access port trait.

use crate::domain::error::IndexboardError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::period::LookbackPeriod;

pub trait DataPort {
    /// Short name used in log lines and notices.
    fn source_name(&self) -> &str;

    /// Daily bars for `ticker` covering `period` up to the latest trading day.
    ///
    /// An unknown symbol or an empty window is `Ok(vec![])`; only transport
    /// or provider failures are errors.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<Vec<OhlcvBar>, IndexboardError>;
}

impl<T: DataPort + ?Sized> DataPort for Box<T> {
    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    fn fetch_ohlcv(
        &self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<Vec<OhlcvBar>, IndexboardError> {
        (**self).fetch_ohlcv(ticker, period)
    }
}
