//! JSON snapshots in the legacy string-key format.
//!
//! A snapshot is one JSON object mapping legacy keys to records:
//!
//! ```json
//! {
//!   "singapore-p5-3": {"score": 1, "maxScore": 1, "passed": true, "timestamp": "..."},
//!   "fractions-checkpoint-complete": {"score": 1, "maxScore": 1, "passed": true, "timestamp": "..."}
//! }
//! ```
//!
//! Keys that do not parse as a [`ProgressKey`] are skipped on import.

use std::collections::BTreeMap;
use std::path::Path;

use lesson_core::progress::{ProgressKey, ProgressRecord, ProgressStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{ProgressError, Result};
use crate::store::MemoryProgressStore;

/// Serialized progress, keyed by legacy string keys (sorted).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressSnapshot {
    records: BTreeMap<String, ProgressRecord>,
}

impl ProgressSnapshot {
    /// Snapshot every entry of `store`.
    pub fn capture(store: &dyn ProgressStore) -> Self {
        let records = store
            .entries()
            .into_iter()
            .map(|(key, record)| (key.to_string(), record))
            .collect();
        Self { records }
    }

    /// Parse a snapshot from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the snapshot as pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ProgressError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Write the snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| ProgressError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(?path, records = self.len(), "saved progress snapshot");
        Ok(())
    }

    /// Number of entries, including ones that will not parse.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every parseable entry into `store`, replacing existing records.
    ///
    /// Returns the number of entries imported.
    pub fn restore_into(&self, store: &dyn ProgressStore) -> usize {
        let mut imported = 0;
        for (raw, record) in &self.records {
            match ProgressKey::parse_legacy(raw) {
                Some(key) => {
                    store.set(key, record.clone());
                    imported += 1;
                }
                None => warn!(key = %raw, "skipping unrecognized progress key"),
            }
        }
        imported
    }
}

impl MemoryProgressStore {
    /// Snapshot this store.
    pub fn export_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::capture(self)
    }

    /// Import a snapshot, returning the number of records written.
    pub fn import_snapshot(&self, snapshot: &ProgressSnapshot) -> usize {
        snapshot.restore_into(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lesson_core::logging::capture_logs;
    use lesson_core::progress::ProgressLookup;

    const LEGACY: &str = r#"{
        "singapore-p5-3": {"score": 1, "maxScore": 1, "passed": true, "timestamp": "2025-01-05T10:00:00Z"},
        "singapore-p5-4": {"score": 0, "maxScore": 1, "passed": false, "timestamp": "2025-01-05T10:01:00Z"},
        "cp-1-complete": {"score": 1, "maxScore": 1, "passed": true, "timestamp": "2025-01-05T10:02:00Z"},
        "fractions": {"score": 1, "maxScore": 1, "passed": true, "timestamp": "2025-01-05T10:03:00Z"}
    }"#;

    #[test]
    fn imports_legacy_document() {
        let snapshot = ProgressSnapshot::from_json_str(LEGACY).unwrap();
        let store = MemoryProgressStore::new();
        let (logs, _guard) = capture_logs();

        assert_eq!(store.import_snapshot(&snapshot), 3);
        assert!(store.is_passed(&ProgressKey::quiz("singapore-p5", 3)));
        assert!(!store.is_passed(&ProgressKey::quiz("singapore-p5", 4)));
        assert!(store.has_record(&ProgressKey::completion("cp-1")));
        assert!(logs.has_message("skipping unrecognized progress key"));
    }

    #[test]
    fn export_uses_legacy_keys() {
        let store = MemoryProgressStore::new();
        let _ = store.record_quiz_result("p3", 7, 1.0, 1.0);
        let _ = store.mark_checkpoint_complete("end");

        let json: serde_json::Value =
            serde_json::from_str(&store.export_snapshot().to_json_string().unwrap()).unwrap();
        assert_eq!(json["p3-7"]["passed"], true);
        assert_eq!(json["p3-7"]["maxScore"], 1.0);
        assert!(json.get("end-complete").is_some());
    }

    #[test]
    fn save_then_load_restores_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let store = MemoryProgressStore::new();
        let _ = store.record_quiz_result("p4", 2, 0.0, 1.0);
        let _ = store.mark_checkpoint_complete("cp");
        store.export_snapshot().save(&path).unwrap();

        let restored = MemoryProgressStore::new();
        let snapshot = ProgressSnapshot::load(&path).unwrap();
        assert_eq!(restored.import_snapshot(&snapshot), 2);
        assert_eq!(restored.to_map(), store.to_map());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert_matches!(
            ProgressSnapshot::load(Path::new("/nonexistent/progress.json")),
            Err(ProgressError::Io { .. })
        );
    }

    #[test]
    fn malformed_record_is_json_error() {
        assert_matches!(
            ProgressSnapshot::from_json_str(r#"{"p5-1": {"score": "high"}}"#),
            Err(ProgressError::Json(_))
        );
    }
}
