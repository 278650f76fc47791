//! Error types for the assistant session core.

use std::time::Duration;

/// Errors surfaced by the remote assistant gateway.
///
/// The gateway carries no implicit retry; each failure is returned typed so
/// the session layer can decide what is retryable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Transport or connection failure. Retryable without edits.
    #[error("Network error: {0}")]
    Network(String),

    /// The server rejected the submitted fields.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The assistant no longer exists server-side.
    #[error("Assistant not found: {id}")]
    NotFound { id: String },

    /// An upload was rejected by the server.
    #[error("Upload rejected: {0}")]
    Payload(String),
}

/// Top-level error type for session operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// A commit or upload was attempted with nothing selected.
    #[error("No assistant selected")]
    NoSelection,

    /// A commit was issued while a previous one is still in flight.
    #[error("A commit is already in flight")]
    CommitInFlight,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// A gateway call exceeded the configured deadline.
    #[error("Gateway call timed out after {0:?}")]
    Timeout(Duration),

    /// Reading the local file for an upload failed.
    #[error("Failed to read upload source: {0}")]
    FileRead(String),
}

impl SessionError {
    /// Whether the caller may retry the operation without editing input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Gateway(GatewayError::Network(_))
        )
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
