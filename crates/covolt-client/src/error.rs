//! Client error types.

/// Errors that can occur when using the covolt client.
///
/// Rejections the caller is expected to branch on get dedicated variants,
/// parsed from the stable reason codes in the service's error envelope.
/// Everything else lands in [`ClientError::Api`] with the raw code.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The monthly override budget is used up.
    #[error("override limit exceeded: {used} of {max} used this month")]
    OverrideLimitExceeded {
        /// Overrides already consumed this month.
        used: u32,
        /// The monthly budget.
        max: u32,
    },

    /// An overlapping booking belongs to a higher-share owner.
    #[error("slot held by a higher-share owner: {message}")]
    LowerOwnership {
        /// Server-provided message.
        message: String,
    },

    /// An overlapping booking belongs to an equal-share owner.
    #[error("slot held by an equal-share owner: {message}")]
    EqualOwnership {
        /// Server-provided message.
        message: String,
    },

    /// The caller already holds an overlapping booking.
    #[error("caller already holds an overlapping booking: {message}")]
    SelfConflict {
        /// Server-provided message.
        message: String,
    },

    /// The booking would exceed the monthly distinct-day cap.
    #[error("day quota exceeded: {days} distinct days, limit {max}")]
    DayQuotaExceeded {
        /// Distinct booked days the request would reach.
        days: u32,
        /// The monthly cap.
        max: u32,
    },

    /// The booking does not exist.
    #[error("booking not found")]
    NotFound,

    /// The booking is already canceled or overridden.
    #[error("booking is already {status}")]
    AlreadyTerminal {
        /// The terminal status reported by the server.
        status: String,
    },

    /// The engine could not take its locks in time; safe to retry.
    #[error("reservation engine busy: {message}")]
    EngineBusy {
        /// Server-provided message.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether retrying the same request may succeed without any other
    /// change.
    ///
    /// Only transport failures and engine lock timeouts qualify; every
    /// business rejection would need different input or a later month.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::EngineBusy { .. })
    }
}
