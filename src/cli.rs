//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::domain::analysis::{AnalysisReport, AnalysisRequest, run_analysis};
use crate::domain::config_validation::{
    DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS, require_date, require_string, retries,
    timeout_secs, validate_config, window,
};
use crate::domain::error::AnalysisError;
use crate::domain::indicator::ColumnName;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "stockdash",
    about = "Historical price analysis with technical indicators"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, compute indicators and write a report
    Analyze(AnalyzeArgs),
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct AnalyzeArgs {
    /// INI file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub ticker: Option<String>,
    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day (inclusive), YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Market index for beta [default: ^GSPC]
    #[arg(long)]
    pub benchmark: Option<String>,
    #[arg(long, value_enum)]
    pub source: Option<DataSourceKind>,
    /// Directory of <TICKER>.csv files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub ma_window: Option<usize>,
    #[arg(long)]
    pub ema_span: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Csv,
    Yahoo,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Html,
    Csv,
}

/// Everything `analyze` needs once flags and config have been merged.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeSettings {
    pub request: AnalysisRequest,
    pub source: DataSourceKind,
    pub data_dir: Option<PathBuf>,
    pub timeout: Duration,
    pub retries: u32,
    pub format: ReportFormat,
    pub output: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn missing(section: &str, key: &str) -> AnalysisError {
    AnalysisError::ConfigMissing {
        section: section.into(),
        key: key.into(),
    }
}

fn config_string(config: Option<&dyn ConfigPort>, section: &str, key: &str) -> Option<String> {
    config
        .and_then(|c| c.get_string(section, key))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn resolve_date(
    flag: Option<NaiveDate>,
    config: Option<&dyn ConfigPort>,
    key: &str,
) -> Result<NaiveDate, AnalysisError> {
    match (flag, config) {
        (Some(date), _) => Ok(date),
        (None, Some(c)) => require_date(c, "analysis", key),
        (None, None) => Err(missing("analysis", key)),
    }
}

fn resolve_window(
    flag: Option<usize>,
    config: Option<&dyn ConfigPort>,
    key: &str,
    default: usize,
) -> Result<usize, AnalysisError> {
    if let Some(value) = flag {
        return Ok(value);
    }
    let configured = match config {
        Some(c) => window(c, key)?,
        None => None,
    };
    Ok(configured.unwrap_or(default))
}

fn parse_choice<T: ValueEnum>(
    config: Option<&dyn ConfigPort>,
    section: &str,
    key: &str,
) -> Result<Option<T>, AnalysisError> {
    config_string(config, section, key)
        .map(|raw| {
            T::from_str(&raw, true).map_err(|reason| AnalysisError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason,
            })
        })
        .transpose()
}

/// Default report path: `<ticker>_report.<ext>` in the working directory.
pub fn default_output(ticker: &str, format: ReportFormat) -> PathBuf {
    let stem: String = ticker
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let ext = build_report_port(format).extension();
    PathBuf::from(format!("{stem}_report.{ext}"))
}

/// Merge command-line flags over config values.
pub fn resolve_settings(
    args: &AnalyzeArgs,
    config: Option<&dyn ConfigPort>,
) -> Result<AnalyzeSettings, AnalysisError> {
    let ticker = match &args.ticker {
        Some(t) => t.trim().to_string(),
        None => match config {
            Some(c) => require_string(c, "analysis", "ticker")?,
            None => return Err(missing("analysis", "ticker")),
        },
    };
    let start_date = resolve_date(args.start, config, "start_date")?;
    let end_date = resolve_date(args.end, config, "end_date")?;

    let mut request = AnalysisRequest::new(ticker, start_date, end_date);
    if let Some(benchmark) = args
        .benchmark
        .clone()
        .or_else(|| config_string(config, "analysis", "benchmark"))
    {
        request.benchmark = benchmark;
    }
    request.ma_window = resolve_window(args.ma_window, config, "ma_window", request.ma_window)?;
    request.ema_span = resolve_window(args.ema_span, config, "ema_span", request.ema_span)?;

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config_string(config, "data", "csv_dir").map(PathBuf::from));

    // A CSV directory alone implies the CSV source.
    let source = match (args.source, parse_choice::<DataSourceKind>(config, "data", "source")?) {
        (Some(s), _) | (None, Some(s)) => s,
        (None, None) if data_dir.is_some() => DataSourceKind::Csv,
        (None, None) => DataSourceKind::Yahoo,
    };
    if source == DataSourceKind::Csv && data_dir.is_none() {
        return Err(missing("data", "csv_dir"));
    }

    let (timeout, retry_count) = match config {
        Some(c) => (timeout_secs(c)?, retries(c)?),
        None => (DEFAULT_TIMEOUT_SECS, DEFAULT_RETRIES),
    };

    let format = match args.format {
        Some(f) => f,
        None => parse_choice::<ReportFormat>(config, "report", "format")?.unwrap_or_default(),
    };
    let output = args
        .output
        .clone()
        .or_else(|| config_string(config, "report", "output").map(PathBuf::from))
        .unwrap_or_else(|| default_output(&request.ticker, format));

    Ok(AnalyzeSettings {
        request,
        source,
        data_dir,
        timeout: Duration::from_secs(timeout),
        retries: retry_count,
        format,
        output,
    })
}

pub fn build_data_port(settings: &AnalyzeSettings) -> Result<Box<dyn DataPort>, AnalysisError> {
    match settings.source {
        DataSourceKind::Csv => {
            let dir = settings
                .data_dir
                .clone()
                .ok_or_else(|| missing("data", "csv_dir"))?;
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        #[cfg(feature = "yahoo")]
        DataSourceKind::Yahoo => {
            use crate::adapters::yahoo_adapter::YahooAdapter;
            Ok(Box::new(YahooAdapter::new(settings.timeout, settings.retries)?))
        }
        #[cfg(not(feature = "yahoo"))]
        DataSourceKind::Yahoo => Err(AnalysisError::invalid_parameter(
            "source",
            "yahoo feature is required for the yahoo source",
        )),
    }
}

pub fn build_report_port(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Html => Box::new(HtmlReportAdapter::new()),
        ReportFormat::Csv => Box::new(CsvReportAdapter::new()),
    }
}

fn run_analyze(args: &AnalyzeArgs) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match &args.config {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            if let Err(e) = validate_config(&adapter) {
                eprintln!("error: {e}");
                return (&e).into();
            }
            Some(adapter)
        }
        None => None,
    };

    // Stage 2: Merge flags over config
    let settings = match resolve_settings(args, adapter.as_ref().map(|a| a as &dyn ConfigPort)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Data source
    let data_port = match build_data_port(&settings) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let report_port = build_report_port(settings.format);
    run_analyze_pipeline(
        data_port.as_ref(),
        &settings.request,
        report_port.as_ref(),
        &settings.output,
    )
}

/// Fetch, compute, summarise and write the report.
pub fn run_analyze_pipeline(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
    report_port: &dyn ReportPort,
    output: &Path,
) -> ExitCode {
    eprintln!(
        "Analyzing {} from {} to {} (source: {})",
        request.ticker,
        request.start_date,
        request.end_date,
        data_port.name()
    );

    let report = match run_analysis(data_port, request) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(error = %e, "analysis failed");
            eprintln!("error: {}", e.user_message());
            return (&e).into();
        }
    };

    print_summary(&report);

    match report_port.write(&report, output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

fn last_defined(report: &AnalysisReport, name: &ColumnName) -> String {
    report
        .series
        .column(name)
        .and_then(|c| c.values().iter().rev().flatten().next().copied())
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn statistic(result: &Result<f64, AnalysisError>) -> String {
    match result {
        Ok(v) => format!("{v:.4}"),
        Err(e) => e.user_message(),
    }
}

pub fn print_summary(report: &AnalysisReport) {
    let request = &report.request;
    eprintln!("\n=== {} ===", request.ticker);
    eprintln!("Trading Days:     {}", report.series.len());
    if let Some(s) = &report.summary {
        eprintln!("Highest Close:    {:.2} ({})", s.max_close, s.max_date);
        eprintln!("Lowest Close:     {:.2} ({})", s.min_close, s.min_date);
    }
    eprintln!(
        "{:<18}{}",
        format!("Beta vs {}:", request.benchmark),
        statistic(&report.beta)
    );
    eprintln!("Volatility:       {}", statistic(&report.volatility));
    eprintln!(
        "{:<18}{}",
        format!("{}:", ColumnName::Sma(request.ma_window)),
        last_defined(report, &ColumnName::Sma(request.ma_window))
    );
    eprintln!(
        "{:<18}{}",
        format!("{}:", ColumnName::Ema(request.ema_span)),
        last_defined(report, &ColumnName::Ema(request.ema_span))
    );
    eprintln!("MACD:             {}", last_defined(report, &ColumnName::MacdLine));
    eprintln!("Stochastic %K:    {}", last_defined(report, &ColumnName::StochasticK));

    let anomalies = report.series.anomalies();
    if !anomalies.is_empty() {
        eprintln!(
            "warning: {} day(s) with high/low outside open/close",
            anomalies.len()
        );
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let settings = match resolve_settings(&AnalyzeArgs::default(), Some(&adapter)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = settings.request.validate() {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let request = &settings.request;
    eprintln!("\nAnalysis:");
    eprintln!("  ticker:    {}", request.ticker);
    eprintln!("  range:     {} to {}", request.start_date, request.end_date);
    eprintln!("  benchmark: {}", request.benchmark);
    eprintln!("  windows:   MA{} / EMA{}", request.ma_window, request.ema_span);
    eprintln!("Data source: {:?}", settings.source);
    eprintln!("Report:      {:?} -> {}", settings.format, settings.output.display());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
