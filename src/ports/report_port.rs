//! Report rendering port trait.

use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::AnalysisError;

/// Port for presenting a finished analysis.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), AnalysisError>;

    /// Conventional file extension for this format, without the dot.
    fn extension(&self) -> &'static str;
}
