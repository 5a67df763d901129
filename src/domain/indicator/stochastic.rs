//! Stochastic Oscillator.
//!
//! %K = (C - LL(14)) * 100 / (HH(14) - LL(14))
//! %D = SMA(3) of %K
//!
//! %K is undefined for the first 13 positions and wherever HH == LL.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::indicator_helpers::{rolling_max, rolling_mean, rolling_min};
use crate::domain::price_series::PriceSeries;

pub const K_PERIOD: usize = 14;
pub const D_PERIOD: usize = 3;

pub const OVERBOUGHT: f64 = 80.0;
pub const OVERSOLD: f64 = 20.0;

/// Appends the %K and %D columns.
pub fn stochastic(series: &PriceSeries) -> Result<PriceSeries, AnalysisError> {
    let closes = series.closes();
    let high_max = rolling_max(&series.highs(), K_PERIOD)?;
    let low_min = rolling_min(&series.lows(), K_PERIOD)?;

    let k: Vec<Option<f64>> = closes
        .iter()
        .zip(high_max.iter().zip(&low_min))
        .map(|(&close, (hh, ll))| {
            let (hh, ll) = ((*hh)?, (*ll)?);
            let range = hh - ll;
            if range == 0.0 {
                return None;
            }
            Some((close - ll) / range * 100.0)
        })
        .collect();
    let d = rolling_mean(&k, D_PERIOD)?;

    series
        .with_column(DerivedColumn::new(ColumnName::StochasticK, k))?
        .with_column(DerivedColumn::new(ColumnName::StochasticD, d))
}
