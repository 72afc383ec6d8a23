//! Analysis and ingestion error types.

use thiserror::Error;

/// Errors raised by the analysis pipeline.
///
/// Data gaps (short series, too few residuals, single-reading seasons) are
/// not errors; they show up as absent values in the results.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("No readings for city: {0}")]
    CityNotFound(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Errors raised while reading tabular temperature data.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Line {line}: {message}")]
    InvalidRecord { line: u64, message: String },
}

impl IngestError {
    /// Line number of the offending record, when known.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::InvalidRecord { line, .. } => Some(*line),
            Self::Csv(e) => e.position().map(|p| p.line()),
            _ => None,
        }
    }
}
