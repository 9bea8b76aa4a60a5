//! Error types for annotation and geometry operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the annotation core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The print frame is not currently laid out (zero-size or detached).
    #[error("Print frame geometry unavailable")]
    GeometryUnavailable,

    /// A memo stamp was submitted with empty or whitespace-only text.
    #[error("Memo text is empty")]
    EmptyMemoText,

    /// Free text was supplied for a stamp kind that does not carry any.
    #[error("Stamp kind '{0}' does not carry text")]
    UnexpectedText(String),
}
