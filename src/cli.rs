//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::catalog::MarketGroup;
use crate::domain::config_validation::validate_config;
use crate::domain::correlation::{self, Alignment, CorrelationMatrix};
use crate::domain::dashboard::{
    build_chart, build_view, correlation_notice, DashboardSettings, Notice, Selection,
};
use crate::domain::error::IndexboardError;
use crate::domain::fetcher::{CachePolicy, SeriesFetcher};
use crate::domain::indicator_helpers::{DecoratedSeries, IndicatorSettings};
use crate::domain::period::LookbackPeriod;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CSV_DIR: &str = "data";
pub const DEFAULT_LRU_CAPACITY: i64 = 16;

#[derive(Parser, Debug)]
#[command(name = "indexboard", about = "Market index dashboard: trends, indicators and correlations")]
pub struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalog entries
    Catalog {
        #[arg(short, long)]
        group: Option<MarketGroup>,
    },
    /// Fetch one index and print its indicator summary
    Chart {
        #[arg(short, long, default_value = "world")]
        group: MarketGroup,
        #[arg(short, long)]
        index: String,
        #[arg(short, long, default_value = "1y")]
        period: LookbackPeriod,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the return correlation matrix for a group
    Correlate {
        #[arg(short, long, default_value = "world")]
        group: MarketGroup,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Chart plus correlation for one selection
    Dashboard {
        #[arg(short, long, default_value = "world")]
        group: MarketGroup,
        #[arg(short, long)]
        index: String,
        #[arg(short, long, default_value = "1y")]
        period: LookbackPeriod,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        series_out: Option<PathBuf>,
        #[arg(long)]
        matrix_out: Option<PathBuf>,
    },
    /// List symbols available in the CSV data directory
    ListSymbols {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Command {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Catalog { .. } => None,
            Command::Chart { config, .. }
            | Command::Correlate { config, .. }
            | Command::Dashboard { config, .. }
            | Command::ListSymbols { config } => config.as_deref(),
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.command.config_path()) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    init_logging(cli.verbose, &config);

    let result = match cli.command {
        Command::Catalog { group } => run_catalog(group),
        Command::Chart {
            group,
            index,
            period,
            output,
            ..
        } => run_chart(&config, group, &index, period, output.as_deref()),
        Command::Correlate { group, output, .. } => {
            run_correlate(&config, group, output.as_deref())
        }
        Command::Dashboard {
            group,
            index,
            period,
            series_out,
            matrix_out,
            ..
        } => {
            let selection = Selection {
                group,
                index_name: index,
                period,
            };
            run_dashboard(
                &config,
                &selection,
                series_out.as_deref(),
                matrix_out.as_deref(),
            )
        }
        Command::ListSymbols { .. } => run_list_symbols(&config),
    };

    result.unwrap_or_else(|e| fail(&e))
}

fn fail(err: &IndexboardError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Load and validate the INI file; no path means every key takes its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, IndexboardError> {
    let adapter = match path {
        Some(p) => FileConfigAdapter::from_file(p).map_err(|e| IndexboardError::ConfigParse {
            file: p.display().to_string(),
            reason: e.to_string(),
        })?,
        None => FileConfigAdapter::empty(),
    };
    validate_config(&adapter)?;
    Ok(adapter)
}

/// `-v` forces debug; otherwise `RUST_LOG` wins over `[log] level`.
pub fn log_filter(verbose: bool, config: &dyn ConfigPort) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .get_string("log", "level")
            .unwrap_or_else(|| "info".to_string());
        EnvFilter::new(level.trim().to_lowercase())
    })
}

fn init_logging(verbose: bool, config: &dyn ConfigPort) {
    // a second init (e.g. repeated `run` calls in tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, config))
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, IndexboardError> {
    let raw = config.get_int(section, key, default as i64);
    usize::try_from(raw).map_err(|_| IndexboardError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: format!("{} is not a valid window length", raw),
    })
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<DashboardSettings, IndexboardError> {
    let defaults = DashboardSettings::default();
    let indicators = IndicatorSettings {
        ma_short: config_usize(config, "indicators", "ma_short", defaults.indicators.ma_short)?,
        ma_long: config_usize(config, "indicators", "ma_long", defaults.indicators.ma_long)?,
        rsi_period: config_usize(config, "indicators", "rsi_period", defaults.indicators.rsi_period)?,
    };

    let correlation_period = match config.get_string("correlation", "period") {
        Some(p) => p.parse::<LookbackPeriod>().map_err(|_| IndexboardError::ConfigInvalid {
            section: "correlation".into(),
            key: "period".into(),
            reason: format!("unknown period '{}'", p),
        })?,
        None => defaults.correlation_period,
    };

    let alignment = match config
        .get_string("correlation", "alignment")
        .map(|a| a.trim().to_lowercase())
        .as_deref()
    {
        None | Some("pairwise") => Alignment::Pairwise,
        Some("common") => Alignment::Common,
        Some(other) => {
            return Err(IndexboardError::ConfigInvalid {
                section: "correlation".into(),
                key: "alignment".into(),
                reason: format!("unknown alignment '{}'", other),
            });
        }
    };

    Ok(DashboardSettings {
        indicators,
        correlate: config.get_bool("correlation", "enabled", defaults.correlate),
        correlation_period,
        alignment,
    })
}

pub fn build_cache_policy(config: &dyn ConfigPort) -> Result<CachePolicy, IndexboardError> {
    match config.get_string("cache", "policy") {
        Some(p) if p.trim().eq_ignore_ascii_case("lru") => Ok(CachePolicy::Lru {
            capacity: config_usize(config, "cache", "capacity", DEFAULT_LRU_CAPACITY as usize)?,
        }),
        _ => Ok(CachePolicy::Unbounded),
    }
}

pub fn default_source() -> &'static str {
    if cfg!(feature = "yahoo") { "yahoo" } else { "csv" }
}

fn csv_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "csv_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR))
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, IndexboardError> {
    let source = config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| default_source().to_string());

    match source.as_str() {
        "csv" => Ok(Box::new(CsvAdapter::new(csv_dir(config)))),
        "yahoo" => build_yahoo_port(config),
        other => Err(IndexboardError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source '{}'", other),
        }),
    }
}

/// `[data] timeout_secs`; zero or absent means no limit.
pub fn request_timeout(config: &dyn ConfigPort) -> Result<Option<Duration>, IndexboardError> {
    let secs = config.get_double("data", "timeout_secs", 0.0);
    if secs == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|e| IndexboardError::ConfigInvalid {
            section: "data".into(),
            key: "timeout_secs".into(),
            reason: e.to_string(),
        })
}

#[cfg(feature = "yahoo")]
fn build_yahoo_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, IndexboardError> {
    use crate::adapters::yahoo_adapter::YahooAdapter;

    Ok(Box::new(YahooAdapter::new(request_timeout(config)?)?))
}

#[cfg(not(feature = "yahoo"))]
fn build_yahoo_port(_config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, IndexboardError> {
    Err(IndexboardError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "yahoo feature is required for the yahoo source".into(),
    })
}

pub fn build_fetcher(
    config: &dyn ConfigPort,
) -> Result<SeriesFetcher<Box<dyn DataPort>>, IndexboardError> {
    let port = build_data_port(config)?;
    let policy = build_cache_policy(config)?;
    debug!(source = port.source_name(), ?policy, "data source ready");
    Ok(SeriesFetcher::with_policy(port, policy))
}

fn run_catalog(group: Option<MarketGroup>) -> Result<ExitCode, IndexboardError> {
    let groups = match group {
        Some(g) => vec![g],
        None => MarketGroup::ALL.to_vec(),
    };
    for g in groups {
        println!("{}", g.label());
        for entry in g.entries() {
            println!("  {:<24} {}", entry.name, entry.ticker);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("note: {notice}");
    }
}

fn run_chart(
    config: &dyn ConfigPort,
    group: MarketGroup,
    index: &str,
    period: LookbackPeriod,
    output: Option<&Path>,
) -> Result<ExitCode, IndexboardError> {
    let settings = build_settings(config)?;
    let entry = group.resolve(index)?;
    let mut fetcher = build_fetcher(config)?;

    let outcome = build_chart(&mut fetcher, entry.ticker, period, &settings.indicators)?;
    if let Some(decorated) = &outcome.decorated {
        print!("{}", format_chart_summary(entry.name, decorated));
        if let Some(path) = output {
            CsvReportAdapter::default().write_series(decorated, path)?;
            eprintln!("Series written to: {}", path.display());
        }
    }
    print_notices(&outcome.notices);
    Ok(ExitCode::SUCCESS)
}

fn run_correlate(
    config: &dyn ConfigPort,
    group: MarketGroup,
    output: Option<&Path>,
) -> Result<ExitCode, IndexboardError> {
    let settings = build_settings(config)?;
    let mut fetcher = build_fetcher(config)?;

    let matrix = correlation::correlate(
        &mut fetcher,
        group.entries(),
        settings.correlation_period,
        settings.alignment,
    );
    println!("{} return correlation ({})", group.label(), settings.correlation_period);
    print!("{}", format_matrix(&matrix));
    if let Some(path) = output {
        CsvReportAdapter::default().write_matrix(&matrix, path)?;
        eprintln!("Matrix written to: {}", path.display());
    }
    print_notices(&correlation_notice(&matrix).into_iter().collect::<Vec<_>>());
    Ok(ExitCode::SUCCESS)
}

fn run_dashboard(
    config: &dyn ConfigPort,
    selection: &Selection,
    series_out: Option<&Path>,
    matrix_out: Option<&Path>,
) -> Result<ExitCode, IndexboardError> {
    let settings = build_settings(config)?;
    let mut fetcher = build_fetcher(config)?;

    let view = build_view(&mut fetcher, selection, &settings)?;
    let report = CsvReportAdapter::default();

    if let Some(decorated) = &view.chart {
        print!("{}", format_chart_summary(view.entry.name, decorated));
        if let Some(path) = series_out {
            report.write_series(decorated, path)?;
            eprintln!("Series written to: {}", path.display());
        }
    }
    if let Some(matrix) = &view.correlation {
        println!();
        println!(
            "{} return correlation ({})",
            selection.group.label(),
            settings.correlation_period
        );
        print!("{}", format_matrix(matrix));
        if let Some(path) = matrix_out {
            report.write_matrix(matrix, path)?;
            eprintln!("Matrix written to: {}", path.display());
        }
    }
    print_notices(&view.notices);

    let stats = fetcher.cache().stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        "fetch cache"
    );

    if view.has_fetch_failure() {
        Ok(ExitCode::from(3))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_list_symbols(config: &dyn ConfigPort) -> Result<ExitCode, IndexboardError> {
    let dir = csv_dir(config);
    let symbols = CsvAdapter::new(dir.clone()).list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found in {}", dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(ExitCode::SUCCESS)
}

fn fmt_opt(value: Option<f64>, suffix: &str, scale: f64) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v * scale, suffix),
        None => "n/a".to_string(),
    }
}

/// Latest value of every indicator, one per line.
pub fn format_chart_summary(name: &str, decorated: &DecoratedSeries) -> String {
    let series = &decorated.series;
    let range = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "no dates".to_string(),
    };
    let rows = [
        ("Close".to_string(), fmt_opt(series.last_close(), "", 1.0)),
        (
            decorated.ma_short.indicator_type.to_string(),
            fmt_opt(decorated.ma_short.latest(), "", 1.0),
        ),
        (
            decorated.ma_long.indicator_type.to_string(),
            fmt_opt(decorated.ma_long.latest(), "", 1.0),
        ),
        ("Return".to_string(), fmt_opt(decorated.returns.latest(), "%", 100.0)),
        (
            decorated.rsi.indicator_type.to_string(),
            fmt_opt(decorated.rsi.latest(), "", 1.0),
        ),
        ("Drawdown".to_string(), fmt_opt(decorated.drawdown.latest(), "%", 1.0)),
        ("Max drawdown".to_string(), fmt_opt(decorated.max_drawdown(), "%", 1.0)),
    ];

    let mut out = format!(
        "{} ({}, {}): {} bars, {}\n",
        name,
        series.ticker,
        series.period,
        series.len(),
        range
    );
    for (label, value) in rows {
        out.push_str(&format!("  {:<14}{}\n", label, value));
    }
    out
}

/// Rows labelled by name, columns by position; undefined cells print as `-`.
pub fn format_matrix(matrix: &CorrelationMatrix) -> String {
    let width = matrix.names().iter().map(|n| n.len()).max().unwrap_or(0) + 5;

    let mut out = format!("{:width$}", "", width = width);
    for i in 0..matrix.size() {
        out.push_str(&format!("{:>7}", format!("[{}]", i + 1)));
    }
    out.push('\n');

    for (i, name) in matrix.names().iter().enumerate() {
        let label = format!("[{}] {}", i + 1, name);
        out.push_str(&format!("{:<width$}", label, width = width));
        for cell in matrix.row(i) {
            let text = match cell {
                Some(v) => format!("{:>7.2}", v),
                None => format!("{:>7}", "-"),
            };
            out.push_str(&text);
        }
        out.push('\n');
    }
    out
}
