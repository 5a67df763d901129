//! Domain error types.

/// Top-level error type for stockdash.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    #[error("not enough data for {statistic}: have {have} values, need {need}")]
    InsufficientData {
        statistic: String,
        have: usize,
        need: usize,
    },

    #[error("degenerate input for {statistic}: {reason}")]
    DegenerateInput { statistic: String, reason: String },

    #[error("malformed price series for {ticker}: {reason}")]
    MalformedSeries { ticker: String, reason: String },

    #[error("column {column} has not been computed yet")]
    MissingColumn { column: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(statistic: &str, have: usize, need: usize) -> Self {
        AnalysisError::InsufficientData {
            statistic: statistic.to_string(),
            have,
            need,
        }
    }

    /// Data-quality failures that leave a single statistic undefined without
    /// invalidating the rest of the analysis.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData { .. } | AnalysisError::DegenerateInput { .. }
        )
    }

    /// Message shown to the end user. Never includes internal detail beyond the
    /// error's own description.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::DataUnavailable { ticker, .. } => format!(
                "Could not retrieve market data for '{ticker}'. Check the ticker symbol and try again."
            ),
            AnalysisError::InsufficientData { statistic, .. } => {
                format!("Not enough data to compute {statistic}.")
            }
            AnalysisError::DegenerateInput { statistic, .. } => {
                format!("{statistic} is undefined for this input.")
            }
            other => other.to_string(),
        }
    }

    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            AnalysisError::Io(_) | AnalysisError::Report { .. } => 1,
            AnalysisError::ConfigParse { .. }
            | AnalysisError::ConfigMissing { .. }
            | AnalysisError::ConfigInvalid { .. } => 2,
            AnalysisError::InvalidParameter { .. } => 3,
            AnalysisError::DataUnavailable { .. } | AnalysisError::MalformedSeries { .. } => 4,
            AnalysisError::InsufficientData { .. }
            | AnalysisError::DegenerateInput { .. }
            | AnalysisError::MissingColumn { .. } => 5,
        }
    }
}

impl From<&AnalysisError> for std::process::ExitCode {
    fn from(err: &AnalysisError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
