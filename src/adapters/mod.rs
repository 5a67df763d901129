//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
pub mod html_report_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
