//! Configuration validation.
//!
//! Checks every value present in the config before any fetch. Keys that can
//! also come from command-line flags are only checked for presence by
//! [`require_string`] / [`require_date`] once the flags have been merged.

use crate::domain::error::AnalysisError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATA_SOURCES: [&str; 2] = ["csv", "yahoo"];
pub const REPORT_FORMATS: [&str; 2] = ["html", "csv"];
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RETRIES: u32 = 1;
pub const MAX_RETRIES: u32 = 3;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    validate_data_section(config)?;
    validate_analysis_section(config)?;
    validate_report_section(config)?;
    Ok(())
}

pub fn validate_data_section(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    validate_choice(config, "data", "source", &DATA_SOURCES)?;

    timeout_secs(config)?;
    retries(config)?;
    Ok(())
}

pub fn validate_analysis_section(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    for key in ["ticker", "benchmark"] {
        if config
            .get_string("analysis", key)
            .is_some_and(|v| v.trim().is_empty())
        {
            return Err(invalid("analysis", key, format!("{key} must not be empty")));
        }
    }

    let start = optional_date(config, "analysis", "start_date")?;
    let end = optional_date(config, "analysis", "end_date")?;
    if matches!((start, end), (Some(start), Some(end)) if start > end) {
        return Err(invalid(
            "analysis",
            "start_date",
            "start_date must not be after end_date",
        ));
    }

    for key in ["ma_window", "ema_span"] {
        window(config, key)?;
    }
    Ok(())
}

pub fn validate_report_section(config: &dyn ConfigPort) -> Result<(), AnalysisError> {
    validate_choice(config, "report", "format", &REPORT_FORMATS)
}

/// `[data] timeout_secs`, positive, or [`DEFAULT_TIMEOUT_SECS`] when absent.
pub fn timeout_secs(config: &dyn ConfigPort) -> Result<u64, AnalysisError> {
    match parse_int(config, "data", "timeout_secs")? {
        None => Ok(DEFAULT_TIMEOUT_SECS),
        Some(v) => u64::try_from(v)
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| invalid("data", "timeout_secs", "timeout_secs must be positive")),
    }
}

/// `[data] retries` in `0..=MAX_RETRIES`, or [`DEFAULT_RETRIES`] when absent.
pub fn retries(config: &dyn ConfigPort) -> Result<u32, AnalysisError> {
    match parse_int(config, "data", "retries")? {
        None => Ok(DEFAULT_RETRIES),
        Some(v) => u32::try_from(v)
            .ok()
            .filter(|&v| v <= MAX_RETRIES)
            .ok_or_else(|| {
                invalid(
                    "data",
                    "retries",
                    format!("retries must be between 0 and {MAX_RETRIES}"),
                )
            }),
    }
}

/// A positive `[analysis]` window such as `ma_window`, if present.
pub fn window(config: &dyn ConfigPort, key: &str) -> Result<Option<usize>, AnalysisError> {
    parse_int(config, "analysis", key)?
        .map(|v| {
            usize::try_from(v)
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| invalid("analysis", key, format!("{key} must be positive")))
        })
        .transpose()
}

/// A non-blank string value, or `ConfigMissing`.
pub fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, AnalysisError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(AnalysisError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        }),
    }
}

/// A `YYYY-MM-DD` value, or `ConfigMissing` / `ConfigInvalid`.
pub fn require_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, AnalysisError> {
    optional_date(config, section, key)?.ok_or_else(|| AnalysisError::ConfigMissing {
        section: section.into(),
        key: key.into(),
    })
}

fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, AnalysisError> {
    config
        .get_date(section, key)
        .transpose()
        .map_err(|raw| {
            invalid(
                section,
                key,
                format!("invalid date '{raw}', expected YYYY-MM-DD"),
            )
        })
}

fn parse_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, AnalysisError> {
    config
        .get_int(section, key)
        .transpose()
        .map_err(|raw| invalid(section, key, format!("'{raw}' is not an integer")))
}

fn validate_choice(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), AnalysisError> {
    match config.get_string(section, key) {
        Some(value) if !allowed.contains(&value.trim().to_lowercase().as_str()) => Err(invalid(
            section,
            key,
            format!("{key} must be one of: {}", allowed.join(", ")),
        )),
        _ => Ok(()),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
