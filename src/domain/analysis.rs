//! Request validation and the end-to-end indicator pipeline.
//!
//! fetch -> daily change -> log returns -> MA -> EMA -> MACD -> stochastic,
//! then volatility and beta over the enriched series.

use chrono::NaiveDate;

use crate::domain::beta::{DEFAULT_BENCHMARK, beta};
use crate::domain::error::AnalysisError;
use crate::domain::indicator::{
    daily_change, ema, exponential_moving_average, log_returns, macd, moving_average, sma,
    stochastic,
};
use crate::domain::price_series::PriceSeries;
use crate::domain::stats::volatility;
use crate::domain::summary::{ClosingSummary, TrendView, trend_view};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub benchmark: String,
    pub ma_window: usize,
    pub ema_span: usize,
}

impl AnalysisRequest {
    pub fn new(ticker: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start_date,
            end_date,
            benchmark: DEFAULT_BENCHMARK.to_string(),
            ma_window: sma::DEFAULT_WINDOW,
            ema_span: ema::DEFAULT_SPAN,
        }
    }

    /// Checks everything that can be rejected before any fetch.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (parameter, symbol) in [("ticker", &self.ticker), ("benchmark", &self.benchmark)] {
            if symbol.trim().is_empty() {
                return Err(AnalysisError::invalid_parameter(
                    parameter,
                    format!("{parameter} must not be empty"),
                ));
            }
            // Symbols name files under the CSV data directory.
            if symbol.contains(['/', '\\']) {
                return Err(AnalysisError::invalid_parameter(
                    parameter,
                    format!("{parameter} '{symbol}' must not contain path separators"),
                ));
            }
        }
        if self.start_date > self.end_date {
            return Err(AnalysisError::invalid_parameter(
                "start_date",
                format!(
                    "start date {} is after end date {}",
                    self.start_date, self.end_date
                ),
            ));
        }
        if self.ma_window == 0 {
            return Err(AnalysisError::invalid_parameter(
                "ma_window",
                "ma_window must be a positive integer",
            ));
        }
        if self.ema_span == 0 {
            return Err(AnalysisError::invalid_parameter(
                "ema_span",
                "ema_span must be a positive integer",
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    pub source: String,
    /// Input series with every derived column appended.
    pub series: PriceSeries,
    pub summary: Option<ClosingSummary>,
    /// `Err` only for data-quality failures (`InsufficientData`, `DegenerateInput`).
    pub beta: Result<f64, AnalysisError>,
    /// `Err` only for data-quality failures (`InsufficientData`, `DegenerateInput`).
    pub volatility: Result<f64, AnalysisError>,
    pub trend: TrendView,
}

/// Apply every column transform in pipeline order.
pub fn enrich(series: &PriceSeries, ma_window: usize, ema_span: usize) -> Result<PriceSeries, AnalysisError> {
    let series = daily_change(series)?;
    let series = log_returns(&series)?;
    let series = moving_average(&series, ma_window)?;
    let series = exponential_moving_average(&series, ema_span)?;
    let series = macd(&series)?;
    stochastic(&series)
}

pub fn run_analysis(
    data_port: &dyn DataPort,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, AnalysisError> {
    request.validate()?;

    let series = data_port.fetch(&request.ticker, request.start_date, request.end_date)?;
    if series.is_empty() {
        return Err(AnalysisError::DataUnavailable {
            ticker: request.ticker.clone(),
            reason: format!(
                "no trading days between {} and {}",
                request.start_date, request.end_date
            ),
        });
    }
    tracing::info!(
        ticker = %request.ticker,
        source = data_port.name(),
        observations = series.len(),
        "fetched price series"
    );

    let series = enrich(&series, request.ma_window, request.ema_span)?;
    tracing::debug!(columns = series.columns().len(), "indicator columns computed");

    let volatility = keep_local(volatility(&series))?;

    let benchmark = data_port.fetch(&request.benchmark, request.start_date, request.end_date)?;
    let beta = keep_local(beta(&series, &benchmark))?;

    let trend = trend_view(&series, request.ma_window, request.ema_span)?;

    Ok(AnalysisReport {
        request: request.clone(),
        source: data_port.name().to_string(),
        summary: ClosingSummary::compute(&series),
        series,
        beta,
        volatility,
        trend,
    })
}

/// Keep data-quality failures as an inline result; propagate everything else.
fn keep_local(result: Result<f64, AnalysisError>) -> Result<Result<f64, AnalysisError>, AnalysisError> {
    match result {
        Ok(v) => Ok(Ok(v)),
        Err(e) if e.is_local() => {
            tracing::debug!(error = %e, "statistic left undefined");
            Ok(Err(e))
        }
        Err(e) => Err(e),
    }
}
