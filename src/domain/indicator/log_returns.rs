//! Log returns of the close.
//!
//! LR[i] = ln(C[i] / C[i-1]). Undefined at i = 0 and wherever either close is
//! non-positive, so no NaN or infinity reaches later aggregation.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::price_series::PriceSeries;

pub fn log_returns(series: &PriceSeries) -> Result<PriceSeries, AnalysisError> {
    let values = log_return_values(&series.closes());
    series.with_column(DerivedColumn::new(ColumnName::LogReturns, values))
}

/// Log returns of an arbitrary price column, aligned with the input.
pub fn log_return_values(prices: &[f64]) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if i == 0 || prices[i] <= 0.0 || prices[i - 1] <= 0.0 {
            values.push(None);
        } else {
            values.push(Some((prices[i] / prices[i - 1]).ln()));
        }
    }
    values
}
