//! Error types for progress snapshots.

/// Errors that can occur when importing or exporting progress.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Snapshot file could not be read or written.
    #[error("progress snapshot I/O error at {path}: {source}")]
    Io {
        /// Snapshot file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Snapshot JSON could not be parsed or produced.
    #[error("invalid progress snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;
