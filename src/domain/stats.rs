//! Sample statistics and annualized volatility.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::ColumnName;
use crate::domain::price_series::PriceSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Sample covariance (n - 1 denominator) of paired observations.
pub fn sample_covariance(pairs: &[(f64, f64)], statistic: &str) -> Result<f64, AnalysisError> {
    let n = pairs.len();
    if n < 2 {
        return Err(AnalysisError::insufficient_data(statistic, n, 2));
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let sum: f64 = pairs.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

    Ok(sum / (n - 1) as f64)
}

/// Sample variance (n - 1 denominator).
pub fn sample_variance(values: &[f64], statistic: &str) -> Result<f64, AnalysisError> {
    let n = values.len();
    if n < 2 {
        return Err(AnalysisError::insufficient_data(statistic, n, 2));
    }

    let m = values.iter().sum::<f64>() / n as f64;
    let sum: f64 = values.iter().map(|v| (v - m).powi(2)).sum();

    Ok(sum / (n - 1) as f64)
}

pub fn sample_std_dev(values: &[f64], statistic: &str) -> Result<f64, AnalysisError> {
    sample_variance(values, statistic).map(f64::sqrt)
}

/// Annualized volatility: sample standard deviation of the defined log
/// returns times √252.
///
/// Requires the Log Returns column to have been computed already.
pub fn volatility(series: &PriceSeries) -> Result<f64, AnalysisError> {
    let returns: Vec<f64> = series
        .require_column(&ColumnName::LogReturns)?
        .defined()
        .collect();

    let std_dev = sample_std_dev(&returns, "volatility")?;
    Ok(std_dev * TRADING_DAYS_PER_YEAR.sqrt())
}
