//! CSV report adapter: the enriched table, one row per trading day.
//!
//! Undefined derived values are written as empty cells.

use std::fs;
use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AnalysisError;
use crate::ports::report_port::ReportPort;

const BASE_HEADERS: [&str; 7] = ["date", "open", "high", "low", "close", "adj_close", "volume"];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_error(e: csv::Error) -> AnalysisError {
    AnalysisError::Report {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), AnalysisError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let series = &report.series;
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_error)?;

        let mut header: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
        header.extend(series.columns().iter().map(|c| c.name().to_string()));
        wtr.write_record(&header).map_err(csv_error)?;

        for (i, obs) in series.observations().iter().enumerate() {
            let mut record = vec![
                obs.date.to_string(),
                obs.open.to_string(),
                obs.high.to_string(),
                obs.low.to_string(),
                obs.close.to_string(),
                obs.adj_close.to_string(),
                obs.volume.to_string(),
            ];
            record.extend(
                series
                    .columns()
                    .iter()
                    .map(|c| c.get(i).map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record).map_err(csv_error)?;
        }

        wtr.flush()?;
        tracing::debug!(path = %output_path.display(), rows = series.len(), "wrote CSV report");
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}
