//! Error types for state-store

use thiserror::Error;

/// Errors raised by state records and the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `update` was called on a record that was never initialized or has been cleared
    #[error("State record '{0}' is not initialized")]
    NotInitialized(String),

    /// The category was not registered when the store was created
    #[error("Unknown state category '{0}'")]
    UnknownCategory(String),
}

/// Result type for state-store operations
pub type Result<T> = std::result::Result<T, StoreError>;
