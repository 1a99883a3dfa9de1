//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON file
//! format. Each type implements [`Default`] with production default values.
//! Types marked with `#[serde(default)]` allow partial JSON: missing fields
//! get their default value during deserialization.

mod content;
mod navigation;

pub use content::*;
pub use navigation::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the lesson engine.
///
/// Loaded from `~/.lesson/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "gating": { "requiredPasses": 6 },
///   "progress": { "passRatio": 0.75 }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonSettings {
    /// Settings schema version.
    pub version: String,
    /// Section gating thresholds.
    pub gating: GatingSettings,
    /// Quiz grading.
    pub progress: ProgressSettings,
    /// Timed review sessions.
    pub review: ReviewSettings,
    /// Catalog search limits.
    pub search: SearchSettings,
    /// Table of contents display.
    pub outline: OutlineSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Topic catalog location.
    pub catalog: CatalogSettings,
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            gating: GatingSettings::default(),
            progress: ProgressSettings::default(),
            review: ReviewSettings::default(),
            search: SearchSettings::default(),
            outline: OutlineSettings::default(),
            logging: LoggingSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

impl LessonSettings {
    /// Clamp out-of-range values and correct invalid invariants.
    ///
    /// Called automatically during loading. Out-of-range values are clamped
    /// with a warning rather than rejected.
    pub fn validate(&mut self) {
        fn clamp_ratio(val: &mut f64, name: &str) {
            if !(0.0..=1.0).contains(val) {
                let clamped = if val.is_nan() { 1.0 } else { val.clamp(0.0, 1.0) };
                tracing::warn!("{name} out of range ({val}), clamped to {clamped}");
                *val = clamped;
            }
        }

        fn at_least_one(val: &mut usize, name: &str) {
            if *val == 0 {
                tracing::warn!("{name} must be at least 1, correcting");
                *val = 1;
            }
        }

        clamp_ratio(&mut self.progress.pass_ratio, "pass_ratio");

        at_least_one(&mut self.gating.min_batch_size, "min_batch_size");
        at_least_one(&mut self.gating.required_passes, "required_passes");
        at_least_one(&mut self.search.min_query_len, "min_query_len");
        at_least_one(&mut self.search.max_results, "max_results");

        if self.review.token.is_empty() {
            tracing::warn!("review token is empty, restoring default");
            self.review.token = ReviewSettings::default().token;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_version() {
        assert_eq!(LessonSettings::default().version, "0.1.0");
    }

    #[test]
    fn default_settings_serde_roundtrip() {
        let defaults = LessonSettings::default();
        let json = serde_json::to_string(&defaults).unwrap();
        let back: LessonSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, defaults);
    }

    #[test]
    fn default_settings_json_field_names() {
        let json = serde_json::to_value(LessonSettings::default()).unwrap();
        assert!(json.get("gating").is_some());
        assert!(json["gating"].get("minBatchSize").is_some());
        assert!(json["progress"].get("passRatio").is_some());
        assert!(json["search"].get("maxResults").is_some());
        assert!(json["outline"].get("checkpointTitle").is_some());
    }

    #[test]
    fn unknown_keys_silently_ignored() {
        let json = serde_json::json!({"theme": "dark", "gating": {"requiredPasses": 3}});
        let settings: LessonSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.gating.required_passes, 3);
    }

    #[test]
    fn empty_json_produces_defaults() {
        let settings: LessonSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, LessonSettings::default());
    }

    #[test]
    fn partial_json_overrides() {
        let json = serde_json::json!({
            "review": { "maxHints": 5 },
            "search": { "maxResults": 25 }
        });
        let settings: LessonSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.review.max_hints, 5);
        assert_eq!(settings.search.max_results, 25);
        assert_eq!(settings.review.seconds_per_question, 120);
        assert_eq!(settings.search.min_query_len, 2);
    }

    // ── validate ───────────────────────────────────────────────────

    #[test]
    fn validate_clamps_pass_ratio_high() {
        let mut s = LessonSettings::default();
        s.progress.pass_ratio = 1.5;
        s.validate();
        assert!((s.progress.pass_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_clamps_pass_ratio_low() {
        let mut s = LessonSettings::default();
        s.progress.pass_ratio = -0.2;
        s.validate();
        assert!(s.progress.pass_ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn validate_corrects_zero_thresholds() {
        let mut s = LessonSettings::default();
        s.gating.min_batch_size = 0;
        s.gating.required_passes = 0;
        s.search.max_results = 0;
        s.validate();
        assert_eq!(s.gating.min_batch_size, 1);
        assert_eq!(s.gating.required_passes, 1);
        assert_eq!(s.search.max_results, 1);
    }

    #[test]
    fn validate_restores_empty_review_token() {
        let mut s = LessonSettings::default();
        s.review.token = String::new();
        s.validate();
        assert_eq!(s.review.token, "review-test");
    }

    #[test]
    fn validate_preserves_valid_values() {
        let mut s = LessonSettings::default();
        s.progress.pass_ratio = 0.6;
        s.gating.required_passes = 4;
        let before = s.clone();
        s.validate();
        assert_eq!(s, before);
    }
}
