//! Assembles everything the presentation layer needs for one selection.

use crate::domain::catalog::{CatalogEntry, MarketGroup};
use crate::domain::correlation::{self, Alignment, CorrelationMatrix, DEFAULT_CORRELATION_PERIOD};
use crate::domain::error::IndexboardError;
use crate::domain::fetcher::SeriesFetcher;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::{decorate_series, DecoratedSeries, IndicatorSettings};
use crate::domain::period::LookbackPeriod;
use crate::ports::data_port::DataPort;
use std::fmt;
use tracing::info;

/// User choices, passed in as plain values by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub group: MarketGroup,
    pub index_name: String,
    pub period: LookbackPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub indicators: IndicatorSettings,
    pub correlate: bool,
    pub correlation_period: LookbackPeriod,
    pub alignment: Alignment,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            indicators: IndicatorSettings::default(),
            correlate: true,
            correlation_period: DEFAULT_CORRELATION_PERIOD,
            alignment: Alignment::default(),
        }
    }
}

/// Non-fatal conditions shown to the user next to the charts.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    FetchFailure {
        ticker: String,
        reason: String,
    },
    EmptyResult {
        ticker: String,
        period: LookbackPeriod,
    },
    InsufficientHistory {
        indicator: IndicatorType,
        needed: usize,
        available: usize,
    },
    PartialCorrelation {
        missing: Vec<String>,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::FetchFailure { ticker, reason } => {
                write!(f, "could not load {}: {}", ticker, reason)
            }
            Notice::EmptyResult { ticker, period } => {
                write!(f, "no data for {} over {}", ticker, period)
            }
            Notice::InsufficientHistory {
                indicator,
                needed,
                available,
            } => write!(
                f,
                "{} needs {} bars, only {} available",
                indicator, needed, available
            ),
            Notice::PartialCorrelation { missing } => {
                write!(f, "correlation unavailable for: {}", missing.join(", "))
            }
        }
    }
}

/// Chart half of the dashboard: the decorated series or why there is none.
#[derive(Debug, Clone)]
pub struct ChartOutcome {
    pub decorated: Option<DecoratedSeries>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selection: Selection,
    pub entry: CatalogEntry,
    pub chart: Option<DecoratedSeries>,
    /// `None` when correlation is switched off in settings.
    pub correlation: Option<CorrelationMatrix>,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    pub fn has_fetch_failure(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::FetchFailure { .. }))
    }
}

/// Fetch and decorate one ticker. Provider failures are returned as errors;
/// empty data and warmup gaps become notices.
pub fn build_chart<P: DataPort>(
    fetcher: &mut SeriesFetcher<P>,
    ticker: &str,
    period: LookbackPeriod,
    settings: &IndicatorSettings,
) -> Result<ChartOutcome, IndexboardError> {
    let series = fetcher.fetch(ticker, period)?;

    if series.is_empty() {
        return Ok(ChartOutcome {
            decorated: None,
            notices: vec![Notice::EmptyResult {
                ticker: series.ticker.clone(),
                period,
            }],
        });
    }

    let available = series.len();
    let decorated = decorate_series((*series).clone(), settings);
    let notices = decorated
        .missing_history()
        .into_iter()
        .map(|indicator| Notice::InsufficientHistory {
            needed: indicator.min_bars(),
            indicator,
            available,
        })
        .collect();

    Ok(ChartOutcome {
        decorated: Some(decorated),
        notices,
    })
}

pub fn correlation_notice(matrix: &CorrelationMatrix) -> Option<Notice> {
    matrix.is_partial().then(|| Notice::PartialCorrelation {
        missing: matrix.missing().iter().map(|m| m.name.clone()).collect(),
    })
}

/// Full recompute for one selection: chart for the chosen index, then the
/// correlation matrix for its whole group. A chart fetch failure does not
/// prevent the correlation from being built.
pub fn build_view<P: DataPort>(
    fetcher: &mut SeriesFetcher<P>,
    selection: &Selection,
    settings: &DashboardSettings,
) -> Result<DashboardView, IndexboardError> {
    let entry = *selection.group.resolve(&selection.index_name)?;
    info!(
        group = %selection.group,
        index = entry.name,
        ticker = entry.ticker,
        period = %selection.period,
        "building dashboard"
    );

    let mut notices = Vec::new();
    let chart = match build_chart(fetcher, entry.ticker, selection.period, &settings.indicators) {
        Ok(outcome) => {
            notices.extend(outcome.notices);
            outcome.decorated
        }
        Err(IndexboardError::FetchFailure { ticker, reason }) => {
            notices.push(Notice::FetchFailure { ticker, reason });
            None
        }
        Err(e) => return Err(e),
    };

    let matrix = settings.correlate.then(|| {
        correlation::correlate(
            fetcher,
            selection.group.entries(),
            settings.correlation_period,
            settings.alignment,
        )
    });
    notices.extend(matrix.as_ref().and_then(correlation_notice));

    Ok(DashboardView {
        selection: selection.clone(),
        entry,
        chart,
        correlation: matrix,
        notices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    struct StaticPort;

    impl DataPort for StaticPort {
        fn source_name(&self) -> &str {
            "static"
        }

        fn fetch_ohlcv(
            &self,
            ticker: &str,
            _period: LookbackPeriod,
        ) -> Result<Vec<OhlcvBar>, IndexboardError> {
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            match ticker {
                "^BSESN" => Err(IndexboardError::fetch_failure(ticker, "HTTP 503")),
                "^NSEBANK" => Ok(vec![]),
                _ => Ok((0..30)
                    .map(|i| {
                        let close = 100.0 + ((i * 7) % 11) as f64;
                        OhlcvBar::from_close(start + chrono::Duration::days(i), close)
                    })
                    .collect()),
            }
        }
    }

    fn selection(name: &str) -> Selection {
        Selection {
            group: MarketGroup::Indian,
            index_name: name.into(),
            period: LookbackPeriod::TwoYears,
        }
    }

    #[test]
    fn notice_display() {
        let n = Notice::InsufficientHistory {
            indicator: IndicatorType::Sma(50),
            needed: 50,
            available: 30,
        };
        assert_eq!(n.to_string(), "MA50 needs 50 bars, only 30 available");
        let p = Notice::PartialCorrelation {
            missing: vec!["SENSEX".into(), "NIFTY BANK".into()],
        };
        assert_eq!(p.to_string(), "correlation unavailable for: SENSEX, NIFTY BANK");
    }

    #[test]
    fn view_for_healthy_index() {
        let mut fetcher = SeriesFetcher::new(StaticPort);
        let view = build_view(&mut fetcher, &selection("NIFTY 50"), &DashboardSettings::default())
            .unwrap();

        assert_eq!(view.entry.ticker, "^NSEI");
        let chart = view.chart.as_ref().unwrap();
        assert_eq!(chart.series.len(), 30);
        assert!(view.notices.contains(&Notice::InsufficientHistory {
            indicator: IndicatorType::Sma(50),
            needed: 50,
            available: 30,
        }));
        assert!(view.notices.contains(&Notice::PartialCorrelation {
            missing: vec!["SENSEX".into(), "NIFTY BANK".into()],
        }));
        assert!(!view.has_fetch_failure());
    }

    #[test]
    fn chart_fetch_failure_still_builds_matrix() {
        let mut fetcher = SeriesFetcher::new(StaticPort);
        let view =
            build_view(&mut fetcher, &selection("SENSEX"), &DashboardSettings::default()).unwrap();

        assert!(view.chart.is_none());
        assert!(view.has_fetch_failure());
        let matrix = view.correlation.as_ref().unwrap();
        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.get_by_name("NIFTY 50", "NIFTY 50"), Some(1.0));
    }

    #[test]
    fn correlation_can_be_switched_off() {
        let mut fetcher = SeriesFetcher::new(StaticPort);
        let settings = DashboardSettings {
            correlate: false,
            ..DashboardSettings::default()
        };
        let view = build_view(&mut fetcher, &selection("NIFTY 50"), &settings).unwrap();
        assert!(view.correlation.is_none());
        // only the chart series was fetched
        assert_eq!(fetcher.cache().len(), 1);
    }

    #[test]
    fn empty_chart_is_a_notice() {
        let mut fetcher = SeriesFetcher::new(StaticPort);
        let view = build_view(&mut fetcher, &selection("NIFTY BANK"), &DashboardSettings::default())
            .unwrap();
        assert!(view.chart.is_none());
        assert_eq!(
            view.notices[0],
            Notice::EmptyResult {
                ticker: "^NSEBANK".into(),
                period: LookbackPeriod::TwoYears,
            }
        );
    }

    #[test]
    fn unknown_index_is_an_error() {
        let mut fetcher = SeriesFetcher::new(StaticPort);
        let err = build_view(&mut fetcher, &selection("FTSE 100 (UK)"), &DashboardSettings::default())
            .unwrap_err();
        assert!(matches!(err, IndexboardError::UnknownIndex { .. }));
    }

    #[test]
    fn build_chart_propagates_fetch_failure() {
        let mut fetcher = SeriesFetcher::new(StaticPort);
        let err = build_chart(
            &mut fetcher,
            "^BSESN",
            LookbackPeriod::OneYear,
            &IndicatorSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IndexboardError::FetchFailure { .. }));
    }
}
