//! Technical indicator transforms.
//!
//! This module provides the types shared by every transform:
//! - `ColumnName`: identity + parameters of a derived column
//! - `DerivedColumn`: values aligned 1:1 with a `PriceSeries`, `None` where undefined
//!
//! Each submodule exposes a pure `fn(&PriceSeries, ..) -> Result<PriceSeries, _>`
//! that returns the input plus its appended column(s).

pub mod daily_change;
pub mod ema;
pub mod log_returns;
pub mod macd;
pub mod sma;
pub mod stochastic;

pub use daily_change::daily_change;
pub use ema::exponential_moving_average;
pub use log_returns::log_returns;
pub use macd::macd;
pub use sma::moving_average;
pub use stochastic::stochastic;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnName {
    DailyChange,
    LogReturns,
    Sma(usize),
    Ema(usize),
    MacdLine,
    MacdSignal,
    MacdHistogram,
    StochasticK,
    StochasticD,
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnName::DailyChange => write!(f, "Daily Change"),
            ColumnName::LogReturns => write!(f, "Log Returns"),
            ColumnName::Sma(window) => write!(f, "MA{}", window),
            ColumnName::Ema(span) => write!(f, "EMA{}", span),
            ColumnName::MacdLine => write!(f, "MACD"),
            ColumnName::MacdSignal => write!(f, "Signal Line"),
            ColumnName::MacdHistogram => write!(f, "MACD Histogram"),
            ColumnName::StochasticK => write!(f, "%K"),
            ColumnName::StochasticD => write!(f, "%D"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    name: ColumnName,
    values: Vec<Option<f64>>,
}

impl DerivedColumn {
    pub fn new(name: ColumnName, values: Vec<Option<f64>>) -> Self {
        Self { name, values }
    }

    pub fn name(&self) -> &ColumnName {
        &self.name
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Defined values only, in index order.
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
