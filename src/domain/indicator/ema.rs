//! Exponential Moving Average of the close.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Every position is defined.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::indicator_helpers::ewm;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_SPAN: usize = 10;

pub fn exponential_moving_average(
    series: &PriceSeries,
    span: usize,
) -> Result<PriceSeries, AnalysisError> {
    let values = ema_of_close(series, span)?;
    series.with_column(DerivedColumn::new(ColumnName::Ema(span), values))
}

pub(crate) fn ema_of_close(series: &PriceSeries, span: usize) -> Result<Vec<Option<f64>>, AnalysisError> {
    let closes: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    ewm(&closes, span)
}
