//! Gating, grading, and review settings.
//!
//! These are the thresholds the navigation engine applies to progress:
//! when a section is locked, when an attempt counts as passed, and how a
//! timed review runs.

use serde::{Deserialize, Serialize};

/// Section gating thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatingSettings {
    /// Minimum quizzes in a section before the next section can be locked.
    pub min_batch_size: usize,
    /// Passed quizzes needed to unlock the next section.
    ///
    /// Fixed regardless of how many quizzes the section has.
    pub required_passes: usize,
}

impl Default for GatingSettings {
    fn default() -> Self {
        Self {
            min_batch_size: 5,
            required_passes: 8,
        }
    }
}

/// Grading of quiz attempts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSettings {
    /// An attempt passes when `score / max_score` reaches this ratio (0.0-1.0).
    pub pass_ratio: f64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self { pass_ratio: 0.8 }
    }
}

/// Timed review sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewSettings {
    /// Deep-link token that starts the chapter review.
    pub token: String,
    /// Title fragment that marks a header as the review section.
    pub title_marker: String,
    /// Time limit per question.
    pub seconds_per_question: u32,
    /// Hints shown before the answer is revealed.
    pub max_hints: u32,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            token: "review-test".to_string(),
            title_marker: "Review Test".to_string(),
            seconds_per_question: 120,
            max_hints: 3,
        }
    }
}
