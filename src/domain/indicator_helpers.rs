//! Window and smoothing routines shared by the indicator transforms.
//!
//! These operate on plain columns rather than on a `PriceSeries` so that
//! derived columns (MACD, %K) can be smoothed with the same code as close.

use crate::domain::error::AnalysisError;

pub fn validate_period(parameter: &str, value: usize) -> Result<(), AnalysisError> {
    if value == 0 {
        return Err(AnalysisError::invalid_parameter(
            parameter,
            format!("{parameter} must be a positive integer"),
        ));
    }
    Ok(())
}

/// Trailing arithmetic mean over `window` values.
///
/// Position i is undefined for i < window - 1 and whenever the window contains
/// an undefined value.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>, AnalysisError> {
    validate_period("window", window)?;

    let result = (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let sum = slice.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))?;
            Some(sum / window as f64)
        })
        .collect();

    Ok(result)
}

/// Exponentially weighted mean with α = 2 / (span + 1), seeded on the first
/// defined value: EMA[seed] = x[seed], EMA[i] = α·x[i] + (1 − α)·EMA[prev].
///
/// Undefined inputs produce undefined outputs; the recursion resumes from the
/// last defined average.
pub fn ewm(values: &[Option<f64>], span: usize) -> Result<Vec<Option<f64>>, AnalysisError> {
    validate_period("span", span)?;

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    let result = values
        .iter()
        .map(|value| {
            let x = (*value)?;
            let next = match prev {
                None => x,
                Some(p) => alpha * x + (1.0 - alpha) * p,
            };
            prev = Some(next);
            Some(next)
        })
        .collect();

    Ok(result)
}

/// Trailing maximum over `window` values; undefined for i < window - 1.
pub fn rolling_max(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalysisError> {
    rolling_extreme(values, window, f64::max)
}

/// Trailing minimum over `window` values; undefined for i < window - 1.
pub fn rolling_min(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalysisError> {
    rolling_extreme(values, window, f64::min)
}

fn rolling_extreme(
    values: &[f64],
    window: usize,
    pick: fn(f64, f64) -> f64,
) -> Result<Vec<Option<f64>>, AnalysisError> {
    validate_period("window", window)?;

    let result = (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i].iter().copied().reduce(pick)
        })
        .collect();

    Ok(result)
}
