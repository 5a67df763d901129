//! HTML report adapter implementing ReportPort.
//!
//! Renders an Askama template with data tables and inline SVG charts.

use std::fs;
use std::path::Path;

use askama::Template;
use chrono::NaiveDate;

use crate::adapters::chart_svg::{
    self, BLUE, GREEN, LineSeries, ORANGE, PURPLE, ReferenceLine,
};
use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn, stochastic};
use crate::ports::report_port::ReportPort;

pub const NOT_AVAILABLE: &str = "Not Available";
const HISTOGRAM_BINS: usize = 100;

struct StatRow {
    label: &'static str,
    value: String,
}

struct LogReturnRow {
    date: String,
    value: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    ticker: String,
    benchmark: String,
    start_date: String,
    end_date: String,
    first_trading_day: String,
    last_trading_day: String,
    source: String,
    observation_count: usize,
    anomalies: Vec<String>,
    summary: Vec<StatRow>,
    risk: Vec<StatRow>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    log_returns: Vec<LogReturnRow>,
    close_svg: String,
    daily_change_svg: String,
    daily_change_hist_svg: String,
    ma_svg: String,
    ema_svg: String,
    trend_svg: String,
    macd_svg: String,
    stochastic_svg: String,
}

pub fn format_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn trading_day(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Scalar statistic: four decimals, or the reason it is undefined.
pub fn format_statistic(result: &Result<f64, AnalysisError>) -> String {
    match result {
        Ok(v) => format!("{v:.4}"),
        Err(e) => e.user_message(),
    }
}

fn column_values<'a>(report: &'a AnalysisReport, name: &ColumnName) -> &'a [Option<f64>] {
    report
        .series
        .column(name)
        .map(DerivedColumn::values)
        .unwrap_or(&[])
}

fn build_template(report: &AnalysisReport) -> ReportTemplate {
    let series = &report.series;
    let request = &report.request;
    let dates = series.dates();
    let closes: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();

    let summary = match &report.summary {
        Some(s) => vec![
            StatRow {
                label: "Highest Close",
                value: format!("{:.2} on {}", s.max_close, s.max_date),
            },
            StatRow {
                label: "Lowest Close",
                value: format!("{:.2} on {}", s.min_close, s.min_date),
            },
        ],
        None => Vec::new(),
    };

    let risk = vec![
        StatRow {
            label: "Beta",
            value: format_statistic(&report.beta),
        },
        StatRow {
            label: "Annualized Volatility",
            value: format_statistic(&report.volatility),
        },
    ];

    let mut headers: Vec<String> = [
        "Date", "Open", "High", "Low", "Close", "Adj Close", "Volume",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    headers.extend(series.columns().iter().map(|c| c.name().to_string()));

    let rows = series
        .observations()
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            let mut row = vec![
                obs.date.to_string(),
                format!("{:.2}", obs.open),
                format!("{:.2}", obs.high),
                format!("{:.2}", obs.low),
                format!("{:.2}", obs.close),
                format!("{:.2}", obs.adj_close),
                obs.volume.to_string(),
            ];
            row.extend(series.columns().iter().map(|c| format_cell(c.get(i), 4)));
            row
        })
        .collect();

    let log_return_values = column_values(report, &ColumnName::LogReturns);
    let log_returns = dates
        .iter()
        .zip(log_return_values)
        .map(|(d, v)| LogReturnRow {
            date: d.to_string(),
            value: format_cell(*v, 6),
        })
        .collect();

    let ma_label = ColumnName::Sma(request.ma_window).to_string();
    let ema_label = ColumnName::Ema(request.ema_span).to_string();
    let daily_change = column_values(report, &ColumnName::DailyChange);
    let daily_change_defined: Vec<f64> = daily_change.iter().flatten().copied().collect();

    let trend = &report.trend;
    let trend_close: Vec<Option<f64>> = trend.close.iter().copied().map(Some).collect();

    ReportTemplate {
        ticker: request.ticker.clone(),
        benchmark: request.benchmark.clone(),
        start_date: request.start_date.to_string(),
        end_date: request.end_date.to_string(),
        first_trading_day: trading_day(series.first_date()),
        last_trading_day: trading_day(series.last_date()),
        source: report.source.clone(),
        observation_count: series.len(),
        anomalies: series.anomalies().iter().map(|d| d.to_string()).collect(),
        summary,
        risk,
        headers,
        rows,
        log_returns,
        close_svg: chart_svg::line_chart(
            "Closing Price",
            &dates,
            &[LineSeries::new("Close", &closes, BLUE)],
            &[],
        ),
        daily_change_svg: chart_svg::line_chart(
            "Daily Change (%)",
            &dates,
            &[LineSeries::new("Daily Change", daily_change, BLUE)],
            &[],
        ),
        daily_change_hist_svg: chart_svg::histogram(
            "Daily Change Distribution",
            &daily_change_defined,
            HISTOGRAM_BINS,
        ),
        ma_svg: chart_svg::line_chart(
            &format!("Moving Average ({ma_label})"),
            &dates,
            &[
                LineSeries::new("Close", &closes, BLUE),
                LineSeries::new(&ma_label, &trend.moving_average, ORANGE),
            ],
            &[],
        ),
        ema_svg: chart_svg::line_chart(
            &format!("Exponential Moving Average ({ema_label})"),
            &dates,
            &[
                LineSeries::new("Close", &closes, BLUE),
                LineSeries::new(&ema_label, &trend.exponential_average, GREEN),
            ],
            &[],
        ),
        trend_svg: chart_svg::line_chart(
            "Trend",
            &trend.dates,
            &[
                LineSeries::new("Close", &trend_close, BLUE),
                LineSeries::new(&ma_label, &trend.moving_average, ORANGE),
                LineSeries::new(&ema_label, &trend.exponential_average, GREEN),
            ],
            &[],
        ),
        macd_svg: chart_svg::line_chart(
            "MACD",
            &dates,
            &[
                LineSeries::new("MACD", column_values(report, &ColumnName::MacdLine), BLUE),
                LineSeries::new(
                    "Signal Line",
                    column_values(report, &ColumnName::MacdSignal),
                    ORANGE,
                ),
            ],
            &[],
        ),
        stochastic_svg: chart_svg::line_chart(
            "Stochastic Oscillator",
            &dates,
            &[
                LineSeries::new("%K", column_values(report, &ColumnName::StochasticK), BLUE),
                LineSeries::new("%D", column_values(report, &ColumnName::StochasticD), PURPLE),
            ],
            &[
                ReferenceLine {
                    value: stochastic::OVERBOUGHT,
                    label: format!("{:.0}", stochastic::OVERBOUGHT),
                },
                ReferenceLine {
                    value: stochastic::OVERSOLD,
                    label: format!("{:.0}", stochastic::OVERSOLD),
                },
            ],
        ),
    }
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &AnalysisReport) -> Result<String, AnalysisError> {
        build_template(report)
            .render()
            .map_err(|e| AnalysisError::Report {
                reason: e.to_string(),
            })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), AnalysisError> {
        let html = self.render(report)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        tracing::debug!(path = %output_path.display(), "wrote HTML report");

        Ok(())
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}
