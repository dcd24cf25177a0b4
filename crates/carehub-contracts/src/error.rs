//! Error types for the CareHub data layer.
//!
//! Query shape never produces an error: unknown tables and filters that match
//! nothing resolve to empty results. The variants below cover the remaining
//! failure paths.

use thiserror::Error;

/// The unified error type for every store and client operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No account has the email the caller tried to sign in with.
    #[error("account not found")]
    AccountNotFound,

    /// The email matched but the password did not.
    ///
    /// Only raised when the store runs with strict credential checking.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An insert or update payload cannot be represented as the target record kind.
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },

    /// Configuration or seed data could not be read or parsed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The backend itself failed (poisoned lock, aborted task, unexpected response).
    #[error("backend error: {reason}")]
    Backend { reason: String },
}

/// Convenience alias used throughout the CareHub crates.
pub type StoreResult<T> = Result<T, StoreError>;
