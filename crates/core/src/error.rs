// Central Error Type for the Engine

use thiserror::Error;

/// Engine-level error type
///
/// Promotion conflicts (a lost Buffered -> Active race) never appear here:
/// they are absorbed inside `reconcile` by retrying against a fresh
/// snapshot.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// Malformed input; caller error, do not retry
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Idempotency conflict: the entry already exists and is not Departed.
    /// Callers may query current status instead of retrying.
    #[error("Duplicate entry: {entry_id} is already registered at {location_id}")]
    DuplicateEntry {
        location_id: String,
        entry_id: String,
    },

    /// Misconfiguration; fatal to the request, not retried
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    /// Transient infrastructure fault; safe to retry with backoff since
    /// all writes are conditional
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl EngineError {
    /// Whether the service boundary may retry the failed operation
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

// From implementation for infra crates (to avoid circular dependency)
impl From<String> for EngineError {
    fn from(err: String) -> Self {
        EngineError::StoreUnavailable(err)
    }
}
