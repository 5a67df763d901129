//! Daily percentage change of the close.
//!
//! DC[i] = (C[i] - C[i-1]) / C[i-1] * 100, undefined at i = 0 and after a
//! zero close.

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::price_series::PriceSeries;

pub fn daily_change(series: &PriceSeries) -> Result<PriceSeries, AnalysisError> {
    let closes = series.closes();
    let mut values = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i == 0 || closes[i - 1] == 0.0 {
            values.push(None);
        } else {
            values.push(Some((closes[i] - closes[i - 1]) / closes[i - 1] * 100.0));
        }
    }

    series.with_column(DerivedColumn::new(ColumnName::DailyChange, values))
}
