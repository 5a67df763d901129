//! Date-indexed price table with appended derived columns.
//!
//! The OHLC observations are fixed at construction. Transforms never mutate a
//! series in place: [`PriceSeries::with_column`] returns a new value carrying
//! the extra column.

use chrono::NaiveDate;

use crate::domain::error::AnalysisError;
use crate::domain::indicator::{ColumnName, DerivedColumn};
use crate::domain::ohlcv::Observation;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    ticker: String,
    observations: Vec<Observation>,
    columns: Vec<DerivedColumn>,
}

impl PriceSeries {
    /// Build a series from raw observations.
    ///
    /// Observations are sorted by date. Duplicate dates and non-finite or
    /// negative prices are rejected. Rows violating the high/low range
    /// invariant are kept as-is and reported through [`PriceSeries::anomalies`].
    pub fn new(
        ticker: impl Into<String>,
        mut observations: Vec<Observation>,
    ) -> Result<Self, AnalysisError> {
        let ticker = ticker.into();
        observations.sort_by_key(|o| o.date);

        if let Some(pair) = observations.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(AnalysisError::MalformedSeries {
                ticker,
                reason: format!("duplicate date {}", pair[0].date),
            });
        }

        if let Some((obs, field)) = observations
            .iter()
            .find_map(|o| o.invalid_price_field().map(|f| (o, f)))
        {
            return Err(AnalysisError::MalformedSeries {
                ticker,
                reason: format!("invalid {} on {}", field, obs.date),
            });
        }

        let series = Self {
            ticker,
            observations,
            columns: Vec::new(),
        };

        let anomalies = series.anomalies();
        if !anomalies.is_empty() {
            tracing::warn!(
                ticker = %series.ticker,
                count = anomalies.len(),
                first = %anomalies[0],
                "observations violate the high/low range invariant"
            );
        }

        Ok(series)
    }

    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            observations: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.close).collect()
    }

    pub fn adj_closes(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.adj_close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.observations.iter().map(|o| o.volume).collect()
    }

    /// Derived columns in the order they were appended.
    pub fn columns(&self) -> &[DerivedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &ColumnName) -> Option<&DerivedColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn require_column(&self, name: &ColumnName) -> Result<&DerivedColumn, AnalysisError> {
        self.column(name).ok_or_else(|| AnalysisError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Return a copy of this series with `column` appended. A column with the
    /// same name is replaced in place.
    pub fn with_column(&self, column: DerivedColumn) -> Result<Self, AnalysisError> {
        if column.len() != self.len() {
            return Err(AnalysisError::invalid_parameter(
                "column",
                format!(
                    "{} has {} values but the series has {} observations",
                    column.name(),
                    column.len(),
                    self.len()
                ),
            ));
        }

        let mut next = self.clone();
        match next.columns.iter_mut().find(|c| c.name() == column.name()) {
            Some(existing) => *existing = column,
            None => next.columns.push(column),
        }
        Ok(next)
    }

    /// Dates whose observation violates the high/low range invariant.
    pub fn anomalies(&self) -> Vec<NaiveDate> {
        self.observations
            .iter()
            .filter(|o| !o.is_range_consistent())
            .map(|o| o.date)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn new_sorts_by_date() {
        let series = PriceSeries::new(
            "TEST",
            vec![
                Observation::flat(date(3), 3.0),
                Observation::flat(date(1), 1.0),
                Observation::flat(date(2), 2.0),
            ],
        )
        .unwrap();
        assert_eq!(series.dates(), vec![date(1), date(2), date(3)]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let result = PriceSeries::new(
            "TEST",
            vec![Observation::flat(date(1), 1.0), Observation::flat(date(1), 2.0)],
        );
        assert!(matches!(
            result,
            Err(AnalysisError::MalformedSeries { ref reason, .. }) if reason.contains("duplicate")
        ));
    }

    #[test]
    fn new_rejects_nan_price() {
        let mut obs = Observation::flat(date(1), 1.0);
        obs.high = f64::NAN;
        let result = PriceSeries::new("TEST", vec![obs]);
        assert!(matches!(result, Err(AnalysisError::MalformedSeries { .. })));
    }

    #[test]
    fn anomalies_are_reported_not_fixed() {
        let mut bad = Observation::flat(date(2), 10.0);
        bad.high = 5.0;
        let series = PriceSeries::new(
            "TEST",
            vec![Observation::flat(date(1), 10.0), bad.clone()],
        )
        .unwrap();

        assert_eq!(series.anomalies(), vec![date(2)]);
        assert_eq!(series.observations()[1], bad);
    }

    #[test]
    fn with_column_appends_without_touching_original() {
        let series = PriceSeries::new(
            "TEST",
            vec![Observation::flat(date(1), 1.0), Observation::flat(date(2), 2.0)],
        )
        .unwrap();
        let column = DerivedColumn::new(ColumnName::DailyChange, vec![None, Some(100.0)]);

        let enriched = series.with_column(column).unwrap();

        assert!(series.columns().is_empty());
        assert_eq!(enriched.columns().len(), 1);
        assert_eq!(
            enriched.column(&ColumnName::DailyChange).unwrap().values(),
            &[None, Some(100.0)]
        );
    }

    #[test]
    fn with_column_replaces_same_name() {
        let series = PriceSeries::new("TEST", vec![Observation::flat(date(1), 1.0)]).unwrap();
        let once = series
            .with_column(DerivedColumn::new(ColumnName::Sma(10), vec![None]))
            .unwrap();
        let twice = once
            .with_column(DerivedColumn::new(ColumnName::Sma(10), vec![Some(1.0)]))
            .unwrap();

        assert_eq!(twice.columns().len(), 1);
        assert_eq!(twice.column(&ColumnName::Sma(10)).unwrap().get(0), Some(1.0));
    }

    #[test]
    fn with_column_rejects_misaligned_length() {
        let series = PriceSeries::new("TEST", vec![Observation::flat(date(1), 1.0)]).unwrap();
        let result = series.with_column(DerivedColumn::new(ColumnName::LogReturns, vec![]));
        assert!(matches!(result, Err(AnalysisError::InvalidParameter { .. })));
    }

    #[test]
    fn require_column_reports_missing_name() {
        let series = PriceSeries::empty("TEST");
        let err = series.require_column(&ColumnName::Ema(10)).unwrap_err();
        assert_eq!(err.to_string(), "column EMA10 has not been computed yet");
    }

    #[test]
    fn empty_series_accessors() {
        let series = PriceSeries::empty("TEST");
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
        assert_eq!(series.ticker(), "TEST");
    }
}
