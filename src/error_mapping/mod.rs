//! Maps library errors to tempscope_core::AppError for consistent user-facing messages.
//! Each library has its own module to keep mappings small and readable.

mod analysis;
mod tracker;
mod weather;

use tempscope_core::AppError;

/// Conversion of a library error into the application error hierarchy
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

/// Convert a library error and wrap it for `anyhow` propagation
pub fn app_error<E: IntoAppError>(e: E) -> anyhow::Error {
    anyhow::Error::new(e.into_app_error())
}
