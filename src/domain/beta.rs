//! Beta of a ticker against a market benchmark.
//!
//! Both series are resampled to monthly periodicity (last adjusted close of each
//! calendar month) and inner-joined on the month. Beta is the ratio of the sample
//! covariance of the two log-return series to the sample variance of the
//! benchmark returns.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::error::AnalysisError;
use crate::domain::indicator::log_returns::log_return_values;
use crate::domain::price_series::PriceSeries;
use crate::domain::stats::{sample_covariance, sample_variance};

pub const DEFAULT_BENCHMARK: &str = "^GSPC";

const MIN_PERIODS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyClose {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub adj_close: f64,
}

/// Last adjusted close of each calendar month present in the series.
pub fn resample_monthly(series: &PriceSeries) -> Vec<MonthlyClose> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for obs in series.observations() {
        months.insert((obs.date.year(), obs.date.month()), obs.adj_close);
    }

    months
        .into_iter()
        .filter_map(|((year, month), adj_close)| {
            NaiveDate::from_ymd_opt(year, month, 1).map(|month| MonthlyClose { month, adj_close })
        })
        .collect()
}

/// Months present in both inputs, as (month, target, benchmark) in date order.
pub fn align_monthly(
    target: &[MonthlyClose],
    benchmark: &[MonthlyClose],
) -> Vec<(NaiveDate, f64, f64)> {
    let bench: BTreeMap<NaiveDate, f64> = benchmark.iter().map(|m| (m.month, m.adj_close)).collect();
    target
        .iter()
        .filter_map(|t| bench.get(&t.month).map(|&b| (t.month, t.adj_close, b)))
        .collect()
}

pub fn beta(target: &PriceSeries, benchmark: &PriceSeries) -> Result<f64, AnalysisError> {
    let aligned = align_monthly(&resample_monthly(target), &resample_monthly(benchmark));
    if aligned.len() < MIN_PERIODS {
        return Err(AnalysisError::insufficient_data("beta", aligned.len(), MIN_PERIODS));
    }

    let target_prices: Vec<f64> = aligned.iter().map(|a| a.1).collect();
    let bench_prices: Vec<f64> = aligned.iter().map(|a| a.2).collect();

    let pairs: Vec<(f64, f64)> = log_return_values(&target_prices)
        .into_iter()
        .zip(log_return_values(&bench_prices))
        .filter_map(|(t, b)| Some((t?, b?)))
        .collect();

    let covariance = sample_covariance(&pairs, "beta")?;
    let bench_returns: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    let variance = sample_variance(&bench_returns, "beta")?;

    if variance == 0.0 {
        return Err(AnalysisError::DegenerateInput {
            statistic: "beta".into(),
            reason: format!("benchmark {} has zero return variance", benchmark.ticker()),
        });
    }

    tracing::debug!(
        ticker = target.ticker(),
        benchmark = benchmark.ticker(),
        periods = aligned.len(),
        "computed beta"
    );

    Ok(covariance / variance)
}
