//! # lesson-settings
//!
//! Layered configuration for the lesson navigation engine.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`LessonSettings::default()`]
//! 2. **User file**: `~/.lesson/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LESSON_*` overrides (highest priority)
//!
//! The global snapshot is reloadable: [`reload_settings_from_path`] swaps
//! the cached value so all subsequent [`get_settings`] calls return fresh
//! data, while callers holding an earlier `Arc` keep a consistent view.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides_from, deep_merge, load_settings,
    load_settings_from_path, settings_path,
};
pub use types::*;

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

/// Global settings snapshot.
///
/// `RwLock<Option<..>>` instead of `OnceLock` so the cached value can be
/// swapped on reload.
static SETTINGS: RwLock<Option<Arc<LessonSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.lesson/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> Arc<LessonSettings> {
    // Fast path: read lock
    if let Some(s) = SETTINGS.read().as_ref() {
        return Arc::clone(s);
    }

    let mut guard = SETTINGS.write();
    // Another thread may have initialized while we waited
    if let Some(s) = guard.as_ref() {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            LessonSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Initialize the global settings with a specific value.
///
/// Replaces any previously cached settings.
pub fn init_settings(settings: LessonSettings) {
    *SETTINGS.write() = Some(Arc::new(settings));
}

/// Reload settings from a specific file path.
///
/// Reads the file, deep-merges over defaults, applies env overrides,
/// and swaps the global cache. On failure the cache falls back to defaults.
pub fn reload_settings_from_path(path: &Path) -> Arc<LessonSettings> {
    let new = Arc::new(match load_settings_from_path(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(
                error = %e,
                ?path,
                "failed to reload settings, falling back to defaults"
            );
            LessonSettings::default()
        }
    });
    *SETTINGS.write() = Some(Arc::clone(&new));
    tracing::info!(?path, "settings reloaded from disk");
    new
}

/// Clear the cached value so the next [`get_settings`] call reloads.
#[cfg(test)]
pub(crate) fn reset_settings() {
    *SETTINGS.write() = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that mutate the global SETTINGS static hold this lock.
    static SETTINGS_MUTEX: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

    #[test]
    fn init_settings_sets_custom_value() {
        let _lock = SETTINGS_MUTEX.lock();
        reset_settings();
        let mut custom = LessonSettings::default();
        custom.gating.required_passes = 3;
        init_settings(custom);
        assert_eq!(get_settings().gating.required_passes, 3);
        reset_settings();
    }

    #[test]
    fn init_settings_replaces_previous() {
        let _lock = SETTINGS_MUTEX.lock();
        reset_settings();
        let mut first = LessonSettings::default();
        first.search.max_results = 4;
        init_settings(first);
        assert_eq!(get_settings().search.max_results, 4);

        let mut second = LessonSettings::default();
        second.search.max_results = 7;
        init_settings(second);
        assert_eq!(get_settings().search.max_results, 7);
        reset_settings();
    }

    #[test]
    fn reload_settings_from_path_updates_cached_value() {
        let _lock = SETTINGS_MUTEX.lock();
        reset_settings();
        init_settings(LessonSettings::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"review": {"secondsPerQuestion": 60}}"#).unwrap();

        let returned = reload_settings_from_path(&path);
        let updated = get_settings();
        assert_eq!(updated.review.seconds_per_question, 60);
        assert_eq!(returned.review.seconds_per_question, 60);
        // Other defaults preserved (deep merge)
        assert_eq!(updated.review.max_hints, 3);
        reset_settings();
    }

    #[test]
    fn reload_from_invalid_file_falls_back_to_defaults() {
        let _lock = SETTINGS_MUTEX.lock();
        reset_settings();
        let mut custom = LessonSettings::default();
        custom.gating.min_batch_size = 9;
        init_settings(custom);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{broken").unwrap();
        let _ = reload_settings_from_path(&path);

        assert_eq!(get_settings().gating.min_batch_size, 5);
        reset_settings();
    }

    #[test]
    fn get_settings_returns_arc_for_snapshot_isolation() {
        let _lock = SETTINGS_MUTEX.lock();
        reset_settings();
        init_settings(LessonSettings::default());

        let snapshot = get_settings();
        let mut new = LessonSettings::default();
        new.progress.pass_ratio = 0.5;
        init_settings(new);

        assert!((snapshot.progress.pass_ratio - 0.8).abs() < f64::EPSILON);
        assert!((get_settings().progress.pass_ratio - 0.5).abs() < f64::EPSILON);
        reset_settings();
    }

    #[test]
    fn deep_merge_re_exported() {
        let merged = deep_merge(serde_json::json!({"x": 1}), serde_json::json!({"y": 2}));
        assert_eq!(merged["x"], 1);
        assert_eq!(merged["y"], 2);
    }
}
