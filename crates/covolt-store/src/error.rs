//! Error types for covolt storage.

use covolt_core::{BookingStatus, ReservationError};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// The booking is already in a terminal state.
    #[error("booking is already {status}")]
    AlreadyTerminal {
        /// The terminal status the booking is in.
        status: BookingStatus,
    },

    /// The override budget for the month is used up.
    #[error("override quota exhausted: {used} of {max} used")]
    QuotaExhausted {
        /// Overrides already consumed this month.
        used: u32,
        /// The monthly budget.
        max: u32,
    },
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(message) | StoreError::Serialization(message) => {
                Self::Storage(message)
            }
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyTerminal { status } => Self::AlreadyTerminal { status },
            StoreError::QuotaExhausted { used, max } => Self::OverrideLimitExceeded { used, max },
        }
    }
}
