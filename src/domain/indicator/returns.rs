//! Percent return (fractional change between consecutive closes).
//!
//! R[i] = (C[i] - C[i-1]) / C[i-1]
//! Invalid at the first bar, wherever the previous close is zero, and where
//! the ratio overflows to infinity.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_returns(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let ret = i
            .checked_sub(1)
            .map(|p| bars[p].close)
            .filter(|&prev| prev != 0.0)
            .map(|prev| (bar.close - prev) / prev);
        let point = match ret {
            Some(r) if r.is_finite() => IndicatorPoint::defined(bar.date, r),
            _ => IndicatorPoint::undefined(bar.date),
        };
        values.push(point);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Returns,
        values,
    }
}
