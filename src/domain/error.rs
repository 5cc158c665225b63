//! Errors raised by the item algebra

use thiserror::Error;

/// Errors produced while building, comparing or merging timeline items
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Input text or a record could not be interpreted
    #[error("Invalid format: {0}")]
    Format(String),

    /// A bound lies outside what the operation accepts
    #[error("Out of range: {0}")]
    Range(String),

    /// The receiver is not in a state that permits the operation
    #[error("Invalid state: {0}")]
    State(String),

    /// A concrete point in time was required
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}
