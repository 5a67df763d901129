//! Closing-price extremes and the moving-average trend view.

use chrono::NaiveDate;

use crate::domain::error::AnalysisError;
use crate::domain::indicator::ColumnName;
use crate::domain::price_series::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct ClosingSummary {
    pub max_close: f64,
    pub max_date: NaiveDate,
    pub min_close: f64,
    pub min_date: NaiveDate,
}

impl ClosingSummary {
    /// Highest and lowest close with the first date each was observed.
    /// `None` for an empty series.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let first = series.observations().first()?;
        let mut summary = ClosingSummary {
            max_close: first.close,
            max_date: first.date,
            min_close: first.close,
            min_date: first.date,
        };

        for obs in series.observations().iter().skip(1) {
            if obs.close > summary.max_close {
                summary.max_close = obs.close;
                summary.max_date = obs.date;
            }
            if obs.close < summary.min_close {
                summary.min_close = obs.close;
                summary.min_date = obs.date;
            }
        }

        Some(summary)
    }
}

/// Close, MA and EMA aligned on the series dates, ready for a single chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendView {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub moving_average: Vec<Option<f64>>,
    pub exponential_average: Vec<Option<f64>>,
}

/// Fails with `MissingColumn` unless the MA(`window`) and EMA(`span`)
/// transforms have already run on `series`.
pub fn trend_view(series: &PriceSeries, window: usize, span: usize) -> Result<TrendView, AnalysisError> {
    let ma = series.require_column(&ColumnName::Sma(window))?;
    let ema = series.require_column(&ColumnName::Ema(span))?;

    Ok(TrendView {
        dates: series.dates(),
        close: series.closes(),
        moving_average: ma.values().to_vec(),
        exponential_average: ema.values().to_vec(),
    })
}
