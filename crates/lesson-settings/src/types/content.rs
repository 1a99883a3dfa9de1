//! Catalog, search, outline, and logging settings.

use serde::{Deserialize, Serialize};

/// Where the topic catalog lives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// Path to `topics.json`.
    pub path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: "topics.json".to_string(),
        }
    }
}

/// Catalog search limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// Queries shorter than this (in characters) return nothing.
    pub min_query_len: usize,
    /// Maximum results returned.
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            max_results: 10,
        }
    }
}

/// Table of contents and module dashboard display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutlineSettings {
    /// Descriptions longer than this many bytes are truncated.
    pub max_description_len: usize,
    /// Title shown for checkpoints without one.
    pub checkpoint_title: String,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            max_description_len: 120,
            checkpoint_title: "Review Checkpoint".to_string(),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Human-readable lines.
    #[default]
    Compact,
    /// JSON lines.
    Json,
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `"warn"` or `"lesson_engine=debug"`.
    pub level: String,
    /// Output format.
    pub format: LogOutput,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogOutput::Compact,
        }
    }
}
