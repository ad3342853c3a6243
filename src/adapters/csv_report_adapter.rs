//! CSV report adapter.
//!
//! Writes the decorated series (one row per date) and the correlation matrix
//! (square, names on both axes) for external charting. Undefined values are
//! written as empty cells.

use crate::domain::correlation::CorrelationMatrix;
use crate::domain::error::IndexboardError;
use crate::domain::indicator_helpers::DecoratedSeries;
use crate::ports::report_port::ReportPort;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub struct CsvReportAdapter {
    precision: usize,
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self { precision: 6 }
    }
}

fn report_err(e: impl std::fmt::Display) -> IndexboardError {
    IndexboardError::Report {
        reason: e.to_string(),
    }
}

impl CsvReportAdapter {
    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    fn cell(&self, value: Option<f64>) -> String {
        value
            .map(|v| format!("{:.*}", self.precision, v))
            .unwrap_or_default()
    }

    pub fn series_to_writer<W: Write>(
        &self,
        series: &DecoratedSeries,
        writer: W,
    ) -> Result<(), IndexboardError> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(series.columns().iter().map(|c| c.indicator_type.to_string()));
        wtr.write_record(&header).map_err(report_err)?;

        for (i, bar) in series.series.bars().iter().enumerate() {
            let mut row = vec![
                bar.date.format("%Y-%m-%d").to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            row.extend(series.columns().iter().map(|c| self.cell(c.get(i))));
            wtr.write_record(&row).map_err(report_err)?;
        }

        wtr.flush()?;
        Ok(())
    }

    pub fn matrix_to_writer<W: Write>(
        &self,
        matrix: &CorrelationMatrix,
        writer: W,
    ) -> Result<(), IndexboardError> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(matrix.names().iter().cloned());
        wtr.write_record(&header).map_err(report_err)?;

        for (i, name) in matrix.names().iter().enumerate() {
            let mut row = vec![name.clone()];
            row.extend(matrix.row(i).iter().map(|v| self.cell(*v)));
            wtr.write_record(&row).map_err(report_err)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_series(
        &self,
        series: &DecoratedSeries,
        output_path: &Path,
    ) -> Result<(), IndexboardError> {
        let file = std::fs::File::create(output_path)?;
        self.series_to_writer(series, file)?;
        info!(path = %output_path.display(), rows = series.series.len(), "series written");
        Ok(())
    }

    fn write_matrix(
        &self,
        matrix: &CorrelationMatrix,
        output_path: &Path,
    ) -> Result<(), IndexboardError> {
        let file = std::fs::File::create(output_path)?;
        self.matrix_to_writer(matrix, file)?;
        info!(path = %output_path.display(), size = matrix.size(), "correlation matrix written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::correlation::{correlate_returns, Alignment, MissingReason, ReturnColumn};
    use crate::domain::indicator_helpers::{decorate_series, IndicatorSettings};
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::period::LookbackPeriod;
    use crate::domain::series::TickerSeries;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_series() -> DecoratedSeries {
        let bars = [100.0, 102.0, 101.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                OhlcvBar::from_close(NaiveDate::from_ymd_opt(2024, 5, (i + 1) as u32).unwrap(), c)
            })
            .collect();
        let settings = IndicatorSettings {
            ma_short: 2,
            ma_long: 3,
            rsi_period: 2,
        };
        decorate_series(
            TickerSeries::from_bars("^FCHI", LookbackPeriod::OneYear, bars),
            &settings,
        )
    }

    fn to_string<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), IndexboardError>,
    {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn series_header_and_blank_warmup_cells() {
        let adapter = CsvReportAdapter::with_precision(2);
        let series = sample_series();
        let out = to_string(|buf| adapter.series_to_writer(&series, buf));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            "date,open,high,low,close,volume,MA2,MA3,Returns,RSI(2),Peak,Drawdown"
        );
        assert_eq!(lines[1], "2024-05-01,100,100,100,100,0,,,,,100.00,0.00");
        assert_eq!(lines[2], "2024-05-02,102,102,102,102,0,101.00,,0.02,,102.00,0.00");
        assert!(lines[3].starts_with("2024-05-03,101,101,101,101,0,101.50,101.00,"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn matrix_blank_for_missing_entry() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let columns = vec![
            ReturnColumn {
                name: "SENSEX".into(),
                returns: Ok([(d(1), 0.01), (d(2), 0.02), (d(3), -0.01)].into_iter().collect()),
            },
            ReturnColumn {
                name: "NIFTY BANK".into(),
                returns: Err(MissingReason::NoData),
            },
        ];
        let matrix = correlate_returns(&columns, Alignment::Pairwise);
        let adapter = CsvReportAdapter::with_precision(3);
        let out = to_string(|buf| adapter.matrix_to_writer(&matrix, buf));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], ",SENSEX,NIFTY BANK");
        assert_eq!(lines[1], "SENSEX,1.000,");
        assert_eq!(lines[2], "NIFTY BANK,,");
    }

    #[test]
    fn write_series_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("series.csv");
        CsvReportAdapter::default()
            .write_series(&sample_series(), &path)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let result = CsvReportAdapter::default()
            .write_series(&sample_series(), Path::new("/nonexistent/dir/series.csv"));
        assert!(matches!(result, Err(IndexboardError::Io(_))));
    }
}
