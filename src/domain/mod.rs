//! Core domain types and the indicator pipeline.

pub mod ohlcv;
pub mod price_series;
pub mod indicator;
pub mod indicator_helpers;
pub mod stats;
pub mod beta;
pub mod summary;
pub mod analysis;
pub mod config_validation;
pub mod error;
