//! Runs the full indicator pipeline over a fetched series.

use crate::domain::indicator::drawdown::{calculate_peak, drawdown_from_peak, max_drawdown};
use crate::domain::indicator::returns::calculate_returns;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::series::TickerSeries;

pub const DEFAULT_MA_SHORT: usize = 20;
pub const DEFAULT_MA_LONG: usize = 50;
pub const DEFAULT_RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSettings {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_short: DEFAULT_MA_SHORT,
            ma_long: DEFAULT_MA_LONG,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

/// A price series plus every derived column, each aligned 1:1 by date.
#[derive(Debug, Clone)]
pub struct DecoratedSeries {
    pub series: TickerSeries,
    pub ma_short: IndicatorSeries,
    pub ma_long: IndicatorSeries,
    pub returns: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub peak: IndicatorSeries,
    pub drawdown: IndicatorSeries,
}

impl DecoratedSeries {
    /// Columns in chart order.
    pub fn columns(&self) -> [&IndicatorSeries; 6] {
        [
            &self.ma_short,
            &self.ma_long,
            &self.returns,
            &self.rsi,
            &self.peak,
            &self.drawdown,
        ]
    }

    /// Indicators that have no defined value anywhere in the series.
    pub fn missing_history(&self) -> Vec<IndicatorType> {
        self.columns()
            .into_iter()
            .filter(|c| !c.has_values())
            .map(|c| c.indicator_type.clone())
            .collect()
    }

    pub fn max_drawdown(&self) -> Option<f64> {
        max_drawdown(&self.drawdown)
    }
}

pub fn decorate_series(series: TickerSeries, settings: &IndicatorSettings) -> DecoratedSeries {
    let bars = series.bars();
    let ma_short = calculate_sma(bars, settings.ma_short);
    let ma_long = calculate_sma(bars, settings.ma_long);
    let returns = calculate_returns(bars);
    let rsi = calculate_rsi(bars, settings.rsi_period);
    let peak = calculate_peak(bars);
    let drawdown = drawdown_from_peak(bars, &peak);

    DecoratedSeries {
        series,
        ma_short,
        ma_long,
        returns,
        rsi,
        peak,
        drawdown,
    }
}
