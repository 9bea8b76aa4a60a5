//! Error types for export and print operations.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while preparing or capturing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Geometry or annotation invariant failure from the core.
    #[error("Geometry error: {0}")]
    Geometry(#[from] strollmap_core::CoreError),

    /// An export is already in flight; this request was ignored.
    #[error("An export is already in progress")]
    Busy,

    /// The detached rendering surface could not be constructed.
    #[error("Surface construction failed: {0}")]
    Surface(String),

    /// The external capture capability errored or was denied.
    #[error("Capture failed: {0}")]
    Capture(String),

    /// Printable document composition failed.
    #[error("Document composition failed: {0}")]
    Document(String),

    /// The platform print flow could not be invoked.
    #[error("Print sink failed: {0}")]
    Sink(String),

    /// The host map rejected a view operation.
    #[error("Host map error: {0}")]
    Map(String),
}
