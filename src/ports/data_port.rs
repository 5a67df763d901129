//! Price data access port trait.

use crate::domain::error::AnalysisError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily observations for `ticker` within `[start_date, end_date]`
    /// inclusive. An unknown ticker or unreachable source is
    /// `AnalysisError::DataUnavailable`.
    fn fetch(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AnalysisError>;

    /// Short identifier used in logs and the report header.
    fn name(&self) -> &str;
}
