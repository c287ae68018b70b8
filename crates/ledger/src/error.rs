//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`Auth`] thrown when an operation runs without a user context.
//! - [`Transport`] thrown when the remote service cannot be reached or fails.
//! - [`Validation`] thrown before any remote call when an entry or category
//!   would break a ledger rule.
//! - [`Conflict`] thrown when the remote service holds a newer revision.
//!
//!  [`Auth`]: LedgerError::Auth
//!  [`Transport`]: LedgerError::Transport
//!  [`Validation`]: LedgerError::Validation
//!  [`Conflict`]: LedgerError::Conflict
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Missing user context: {0}")]
    Auth(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Built-in category \"{0}\" cannot be changed")]
    BuiltinCategory(String),
    #[error("Category \"{id}\" is used by {entries} entries")]
    CategoryInUse { id: String, entries: usize },
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Failures reported by a [`LedgerRemote`](crate::LedgerRemote) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("network error: {0}")]
    Transport(String),
}

impl From<RemoteError> for LedgerError {
    fn from(value: RemoteError) -> Self {
        match value {
            RemoteError::Unauthorized => Self::Auth("rejected by remote service".to_string()),
            RemoteError::NotFound(key) => Self::KeyNotFound(key),
            RemoteError::Conflict(message) => Self::Conflict(message),
            RemoteError::Rejected(message) => Self::Validation(message),
            RemoteError::Server(message) | RemoteError::Transport(message) => {
                Self::Transport(message)
            }
        }
    }
}
