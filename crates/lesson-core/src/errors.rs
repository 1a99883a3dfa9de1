//! Error types for the content model.

use thiserror::Error;

/// Errors that can occur when loading or querying the topic catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read the catalog file from disk.
    #[error("failed to read catalog at {path}: {source}")]
    Read {
        /// Catalog file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the catalog JSON.
    #[error("failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// No topic with the requested ID.
    #[error("topic not found: {0}")]
    TopicNotFound(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display_includes_path() {
        let err = CatalogError::Read {
            path: "/data/topics.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/topics.json"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: CatalogError = json_err.into();
        assert!(matches!(err, CatalogError::Json(_)));
        assert!(err.to_string().contains("parse catalog JSON"));
    }

    #[test]
    fn topic_not_found_display() {
        let err = CatalogError::TopicNotFound("p9".into());
        assert_eq!(err.to_string(), "topic not found: p9");
    }
}
