use thiserror::Error;

/// Errors from tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Profile field out of range or unparseable
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Logged amount must be strictly positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No profile for user {0}")]
    ProfileNotFound(i64),

    #[error("Food not found: {0}")]
    FoodNotFound(String),

    /// Food database request failed
    #[error("Food lookup failed: {0}")]
    Lookup(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl TrackerError {
    pub fn invalid_profile(message: impl Into<String>) -> Self {
        Self::InvalidProfile(message.into())
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount(message.into())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
