//! Simple Moving Average of the close.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) positions are undefined.
//! A series shorter than n yields an all-undefined column rather than an error.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::indicator_helpers::rolling_mean;
use crate::domain::price_series::PriceSeries;

pub const DEFAULT_WINDOW: usize = 10;

pub fn moving_average(series: &PriceSeries, window: usize) -> Result<PriceSeries, AnalysisError> {
    let closes: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();
    let values = rolling_mean(&closes, window)?;
    series.with_column(DerivedColumn::new(ColumnName::Sma(window), values))
}
