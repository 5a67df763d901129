#![allow(dead_code)]

use chrono::NaiveDate;
use stockdash::domain::error::AnalysisError;
pub use stockdash::domain::ohlcv::Observation;
use stockdash::domain::price_series::PriceSeries;
use stockdash::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Closing prices of the reference end-to-end scenario.
pub const SCENARIO_CLOSES: [f64; 15] = [
    100.0, 101.0, 99.0, 102.0, 103.0, 101.0, 104.0, 105.0, 103.0, 106.0, 107.0, 105.0, 108.0,
    109.0, 107.0,
];

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Observation>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_observations(mut self, ticker: &str, observations: Vec<Observation>) -> Self {
        self.data.insert(ticker.to_string(), observations);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, AnalysisError> {
        self.calls.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AnalysisError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        let observations = self
            .data
            .get(ticker)
            .ok_or_else(|| AnalysisError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "unknown ticker".into(),
            })?
            .iter()
            .filter(|o| o.date >= start_date && o.date <= end_date)
            .cloned()
            .collect();
        PriceSeries::new(ticker, observations)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One flat observation (open = high = low = close) per calendar day.
pub fn daily_observations(start: &str, closes: &[f64]) -> Vec<Observation> {
    let start = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Observation::flat(start + chrono::Duration::days(i as i64), c))
        .collect()
}

/// One flat observation on the 15th of consecutive months.
pub fn monthly_observations(start_year: i32, closes: &[f64]) -> Vec<Observation> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let year = start_year + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            Observation::flat(NaiveDate::from_ymd_opt(year, month, 15).unwrap(), c)
        })
        .collect()
}

pub fn make_series(ticker: &str, start: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(ticker, daily_observations(start, closes)).unwrap()
}

/// Write `<dir>/<ticker>.csv` in the on-disk price layout.
pub fn write_price_csv(dir: &Path, ticker: &str, observations: &[Observation]) {
    let mut content = String::from("date,open,high,low,close,adj_close,volume\n");
    for o in observations {
        writeln!(
            content,
            "{},{},{},{},{},{},{}",
            o.date, o.open, o.high, o.low, o.close, o.adj_close, o.volume
        )
        .unwrap();
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}
