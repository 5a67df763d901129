//! Single daily OHLCV observation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl Observation {
    /// Observation where every price field equals `close`.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: 0,
        }
    }

    /// high >= low, high >= max(open, close), low <= min(open, close)
    pub fn is_range_consistent(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }

    /// Name of the first price field that is not a finite non-negative number.
    pub fn invalid_price_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("adj_close", self.adj_close),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
        .map(|(name, _)| name)
    }
}
