use std::io;

use tempscope_analysis::{AnalysisError, IngestError};
use tempscope_core::{AppError, DataError};

use super::IntoAppError;

impl IntoAppError for AnalysisError {
    fn into_app_error(self) -> AppError {
        match self {
            AnalysisError::InvalidParameter { name, message } => {
                AppError::Data(DataError::InvalidParameter(format!("{}: {}", name, message)))
            }
            AnalysisError::CityNotFound(city) => AppError::Data(DataError::NotFound(city)),
            AnalysisError::Cancelled => AppError::Data(DataError::Cancelled),
        }
    }
}

impl IntoAppError for IngestError {
    fn into_app_error(self) -> AppError {
        match self {
            IngestError::Open { path, source } if source.kind() == io::ErrorKind::NotFound => {
                AppError::Data(DataError::FileNotFound(path))
            }
            IngestError::Open { source, .. } => AppError::Io(source),
            other => AppError::Data(DataError::InvalidInput(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_file_not_found() {
        let err = IngestError::Open {
            path: "/nope.csv".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(matches!(
            err.into_app_error(),
            AppError::Data(DataError::FileNotFound(p)) if p == "/nope.csv"
        ));
    }

    #[test]
    fn test_bad_record_maps_to_invalid_input() {
        let err = IngestError::InvalidRecord {
            line: 3,
            message: "bad temperature".into(),
        };
        let app = err.into_app_error();
        assert!(matches!(app, AppError::Data(DataError::InvalidInput(_))));
        assert!(app.to_string().contains("Line 3"));
    }

    #[test]
    fn test_cancelled() {
        assert!(matches!(
            AnalysisError::Cancelled.into_app_error(),
            AppError::Data(DataError::Cancelled)
        ));
    }
}
