//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`LessonSettings::default()`]
//! 2. If `~/.lesson/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `LESSON_*` environment variable overrides (highest priority)
//! 4. [`LessonSettings::validate`] clamps anything out of range
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{LessonSettings, LogOutput};

/// Resolve the path to the settings file (`~/.lesson/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".lesson").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<LessonSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<LessonSettings> {
    let mut settings = load_file_layers(path)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Defaults deep-merged with the file at `path`, without env overrides.
fn load_file_layers(path: &Path) -> Result<LessonSettings> {
    let defaults = serde_json::to_value(LessonSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (falling back to file/default).
pub fn apply_env_overrides(settings: &mut LessonSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup` instead of the process environment.
///
/// Recognized keys:
///
/// | Key | Field | Range |
/// |---|---|---|
/// | `LESSON_CATALOG` | `catalog.path` | non-empty |
/// | `LESSON_LOG_LEVEL` | `logging.level` | non-empty |
/// | `LESSON_LOG_FORMAT` | `logging.format` | `compact` / `json` |
/// | `LESSON_MIN_BATCH_SIZE` | `gating.minBatchSize` | 1..=1000 |
/// | `LESSON_REQUIRED_PASSES` | `gating.requiredPasses` | 1..=1000 |
/// | `LESSON_PASS_RATIO` | `progress.passRatio` | 0.0..=1.0 |
/// | `LESSON_REVIEW_TOKEN` | `review.token` | non-empty |
/// | `LESSON_REVIEW_SECONDS` | `review.secondsPerQuestion` | 1..=3600 |
/// | `LESSON_MAX_HINTS` | `review.maxHints` | 0..=20 |
/// | `LESSON_SEARCH_MAX_RESULTS` | `search.maxResults` | 1..=100 |
pub fn apply_overrides_from<F>(settings: &mut LessonSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Catalog / logging ───────────────────────────────────────────
    if let Some(v) = env.string("LESSON_CATALOG") {
        settings.catalog.path = v;
    }
    if let Some(v) = env.string("LESSON_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.parsed("LESSON_LOG_FORMAT", parse_log_output) {
        settings.logging.format = v;
    }

    // ── Gating / grading ────────────────────────────────────────────
    if let Some(v) = env.parsed("LESSON_MIN_BATCH_SIZE", |s| parse_usize_range(s, 1, 1000)) {
        settings.gating.min_batch_size = v;
    }
    if let Some(v) = env.parsed("LESSON_REQUIRED_PASSES", |s| parse_usize_range(s, 1, 1000)) {
        settings.gating.required_passes = v;
    }
    if let Some(v) = env.parsed("LESSON_PASS_RATIO", |s| parse_f64_range(s, 0.0, 1.0)) {
        settings.progress.pass_ratio = v;
    }

    // ── Review / search ─────────────────────────────────────────────
    if let Some(v) = env.string("LESSON_REVIEW_TOKEN") {
        settings.review.token = v;
    }
    if let Some(v) = env.parsed("LESSON_REVIEW_SECONDS", |s| parse_u32_range(s, 1, 3600)) {
        settings.review.seconds_per_question = v;
    }
    if let Some(v) = env.parsed("LESSON_MAX_HINTS", |s| parse_u32_range(s, 0, 20)) {
        settings.review.max_hints = v;
    }
    if let Some(v) = env.parsed("LESSON_SEARCH_MAX_RESULTS", |s| parse_usize_range(s, 1, 100)) {
        settings.search.max_results = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a log format name (case-insensitive).
pub fn parse_log_output(val: &str) -> Option<LogOutput> {
    match val.to_lowercase().as_str() {
        "compact" | "text" => Some(LogOutput::Compact),
        "json" => Some(LogOutput::Json),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a finite `f64` within a range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let val = (self.lookup)(name)?;
        let result = parse(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
