//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(12) - EMA(26) of close
//! Signal Line = EMA(9) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All EMAs are seeded with their first input, so every position is defined.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::ema::ema_of_close;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::indicator_helpers::ewm;
use crate::domain::price_series::PriceSeries;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// Appends the MACD line, signal line and histogram columns.
pub fn macd(series: &PriceSeries) -> Result<PriceSeries, AnalysisError> {
    let fast = ema_of_close(series, FAST_SPAN)?;
    let slow = ema_of_close(series, SLOW_SPAN)?;

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ewm(&line, SIGNAL_SPAN)?;
    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    series
        .with_column(DerivedColumn::new(ColumnName::MacdLine, line))?
        .with_column(DerivedColumn::new(ColumnName::MacdSignal, signal))?
        .with_column(DerivedColumn::new(ColumnName::MacdHistogram, histogram))
}
