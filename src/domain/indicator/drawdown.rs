//! Running peak and percentage drawdown.
//!
//! Peak[i] = max(C[0..=i])
//! Drawdown[i] = (C[i] - Peak[i]) / Peak[i] * 100, always <= 0.
//! Both are defined from the first bar; drawdown is invalid only where the
//! peak is not positive.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_peak(bars: &[OhlcvBar]) -> IndicatorSeries {
    let mut peak = f64::NEG_INFINITY;
    let values = bars
        .iter()
        .map(|bar| {
            peak = peak.max(bar.close);
            IndicatorPoint::defined(bar.date, peak)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Peak,
        values,
    }
}

/// Drawdown against a precomputed running peak; `peak` must come from
/// [`calculate_peak`] over the same bars.
pub fn drawdown_from_peak(bars: &[OhlcvBar], peak: &IndicatorSeries) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(&peak.values)
        .map(|(bar, p)| {
            if p.valid && p.value > 0.0 {
                // close <= peak, so this never exceeds zero
                let dd = ((bar.close - p.value) / p.value * 100.0).min(0.0);
                IndicatorPoint::defined(bar.date, dd)
            } else {
                IndicatorPoint::undefined(bar.date)
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Drawdown,
        values,
    }
}

pub fn calculate_drawdown(bars: &[OhlcvBar]) -> IndicatorSeries {
    drawdown_from_peak(bars, &calculate_peak(bars))
}

/// Deepest drawdown in the series (most negative value).
pub fn max_drawdown(drawdown: &IndicatorSeries) -> Option<f64> {
    drawdown
        .values
        .iter()
        .filter_map(IndicatorPoint::get)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
}
