//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses a simple trailing mean of gains/losses (no Wilder smoothing):
//! - delta[i] = C[i] - C[i-1]
//! - avg_gain[i] = mean(max(delta, 0)) over delta[i-n+1..=i]
//! - avg_loss[i] = mean(max(-delta, 0)) over the same window
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes for one window).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() <= period {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: bars.iter().map(|b| IndicatorPoint::undefined(b.date)).collect(),
        };
    }

    // gains[k] / losses[k] describe the move from bar k to bar k+1
    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i < period {
            values.push(IndicatorPoint::undefined(bar.date));
            continue;
        }
        let window = i - period..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        values.push(IndicatorPoint::defined(bar.date, rsi_from_averages(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar::from_close(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), close)
    }

    fn make_series(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(&format!("2024-01-{:02}", i + 1), c))
            .collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert_eq!(series.values.len(), 0);
    }

    #[test]
    fn rsi_single_bar() {
        let bars = vec![make_bar("2024-01-01", 100.0)];
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.values.len(), 1);
        assert!(!series.values[0].valid);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&make_series(&closes), 14);

        assert_eq!(series.values.len(), 15);
        for i in 0..14 {
            assert!(!series.values[i].valid, "Bar {} should be invalid", i);
        }
        assert!(series.values[14].valid, "Bar 14 should be valid");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_series(&closes), 14);

        assert_eq!(series.get(14), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_series(&closes), 14);

        assert_relative_eq!(series.get(14).unwrap(), 0.0);
    }

    #[test]
    fn rsi_flat_window_saturates() {
        let series = calculate_rsi(&make_series(&[50.0; 16]), 14);
        assert_eq!(series.get(14), Some(100.0));
        assert_eq!(series.get(15), Some(100.0));
    }

    #[test]
    fn rsi_equal_gains_and_losses_is_fifty() {
        // alternating +1/-1 over an even window
        let closes: Vec<f64> = (0..5).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let series = calculate_rsi(&make_series(&closes), 4);
        assert_relative_eq!(series.get(4).unwrap(), 50.0);
    }

    #[test]
    fn rsi_window_slides() {
        // window of 2: deltas +2, -1, -1
        let series = calculate_rsi(&make_series(&[10.0, 12.0, 11.0, 10.0]), 2);
        assert!(!series.values[1].valid);
        // gains [2,0] avg 1, losses [0,1] avg 0.5 -> RS 2 -> 66.67
        assert_relative_eq!(series.get(2).unwrap(), 100.0 - 100.0 / 3.0, epsilon = 1e-9);
        // gains [0,0], losses [1,1] -> 0
        assert_relative_eq!(series.get(3).unwrap(), 0.0);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=20)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let series = calculate_rsi(&make_series(&closes), 14);

        for point in series.values.iter().filter(|p| p.valid) {
            assert!((0.0..=100.0).contains(&point.value), "RSI {} out of range", point.value);
        }
    }

    #[test]
    fn rsi_indicator_type() {
        let series = calculate_rsi(&[make_bar("2024-01-01", 100.0)], 14);
        assert_eq!(series.indicator_type, IndicatorType::Rsi(14));
    }

    #[test]
    fn rsi_zero_period() {
        let bars = vec![make_bar("2024-01-01", 100.0), make_bar("2024-01-02", 101.0)];
        let series = calculate_rsi(&bars, 0);
        assert_eq!(series.values.len(), 2);
        assert!(!series.has_values());
    }

    #[test]
    fn rsi_known_calculation() {
        let bars = make_series(&[
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ]);

        let series = calculate_rsi(&bars, 14);
        let rsi = series.get(14).expect("RSI defined at index 14");

        // gains sum 4.0, losses sum 1.5 over 14 deltas -> RS 8/3
        assert_relative_eq!(rsi, 100.0 - 300.0 / 11.0, epsilon = 1e-9);
    }
}
