use tempscope_core::error::RusqliteErrorExt;
use tempscope_core::{AppError, NetworkError, TrackingError};
use tempscope_tracker::TrackerError;

use super::IntoAppError;

impl IntoAppError for TrackerError {
    fn into_app_error(self) -> AppError {
        match self {
            TrackerError::InvalidProfile(s) | TrackerError::InvalidAmount(s) => {
                AppError::Tracking(TrackingError::InvalidInput(s))
            }
            TrackerError::ProfileNotFound(id) => {
                AppError::Tracking(TrackingError::ProfileNotFound(id))
            }
            TrackerError::FoodNotFound(q) => AppError::Tracking(TrackingError::FoodNotFound(q)),
            TrackerError::Lookup(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            TrackerError::Storage(e) => AppError::Database(e.into_database_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_mapping() {
        let app = TrackerError::ProfileNotFound(7).into_app_error();
        assert!(matches!(app, AppError::Tracking(TrackingError::ProfileNotFound(7))));
        assert!(app.user_message().contains("profile set"));

        assert!(matches!(
            TrackerError::invalid_amount("negative").into_app_error(),
            AppError::Tracking(TrackingError::InvalidInput(_))
        ));
        assert!(matches!(
            TrackerError::Lookup("down".into()).into_app_error(),
            AppError::Network(NetworkError::ConnectionFailed(_))
        ));
    }
}
