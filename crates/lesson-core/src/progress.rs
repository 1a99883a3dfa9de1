//! Typed progress keys and records.
//!
//! Progress is owned by an external store; this crate only defines the
//! vocabulary and the read/write seams:
//!
//! - [`ProgressKey`]: typed replacement for the legacy string keys
//!   (`"{topicId}-{position}"` for quizzes, `"{id}-complete"` for checkpoints)
//! - [`ProgressRecord`]: one graded attempt
//! - [`ProgressLookup`] / [`ProgressStore`]: read-only and read-write store traits
//!
//! A missing record always means "not passed".

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, TopicId};

/// Suffix used by the legacy completion key format.
const COMPLETE_SUFFIX: &str = "-complete";

/// Key of one progress record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProgressKey {
    /// Result of the quiz at `position` in topic `topic_id`.
    Quiz {
        /// Topic containing the quiz.
        topic_id: TopicId,
        /// The quiz's source position in that topic.
        position: usize,
    },
    /// Completion flag for a checkpoint or section, keyed by node ID.
    Completion {
        /// Node ID.
        id: NodeId,
    },
}

impl ProgressKey {
    /// Key for a quiz result.
    pub fn quiz(topic_id: impl Into<TopicId>, position: usize) -> Self {
        Self::Quiz {
            topic_id: topic_id.into(),
            position,
        }
    }

    /// Key for a completion flag.
    pub fn completion(id: impl Into<NodeId>) -> Self {
        Self::Completion { id: id.into() }
    }

    /// Parse a legacy string key.
    ///
    /// `"{id}-complete"` parses as [`ProgressKey::Completion`]; otherwise the
    /// text after the last `-` must be a position for [`ProgressKey::Quiz`].
    /// Anything else returns `None`.
    pub fn parse_legacy(raw: &str) -> Option<Self> {
        if let Some(id) = raw.strip_suffix(COMPLETE_SUFFIX) {
            return (!id.is_empty()).then(|| Self::completion(id));
        }
        let (topic_id, position) = raw.rsplit_once('-')?;
        if topic_id.is_empty() {
            return None;
        }
        let position = position.parse().ok()?;
        Some(Self::quiz(topic_id, position))
    }

    /// Whether this key records a quiz in the given topic.
    pub fn is_quiz_in(&self, topic: &str) -> bool {
        matches!(self, Self::Quiz { topic_id, .. } if topic_id.as_str() == topic)
    }
}

/// Renders the legacy string form.
impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiz { topic_id, position } => write!(f, "{topic_id}-{position}"),
            Self::Completion { id } => write!(f, "{id}{COMPLETE_SUFFIX}"),
        }
    }
}

/// One graded attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Points scored.
    pub score: f64,
    /// Points available.
    pub max_score: f64,
    /// Whether the attempt met the pass ratio.
    pub passed: bool,
    /// When the attempt was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ProgressRecord {
    /// Grade an attempt now. Passes when `score / max_score >= pass_ratio`.
    pub fn graded(score: f64, max_score: f64, pass_ratio: f64) -> Self {
        Self::graded_at(score, max_score, pass_ratio, Utc::now())
    }

    /// Grade an attempt with an explicit timestamp.
    ///
    /// A non-positive `max_score` never passes.
    pub fn graded_at(
        score: f64,
        max_score: f64,
        pass_ratio: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let passed = max_score > 0.0 && score / max_score >= pass_ratio;
        Self {
            score,
            max_score,
            passed,
            timestamp,
        }
    }

    /// A full-marks record (score 1 of 1).
    pub fn full_marks() -> Self {
        Self {
            score: 1.0,
            max_score: 1.0,
            passed: true,
            timestamp: Utc::now(),
        }
    }
}

/// Read-only view of recorded progress.
pub trait ProgressLookup {
    /// Record for `key`, if any.
    fn lookup(&self, key: &ProgressKey) -> Option<ProgressRecord>;

    /// Whether `key` has a passed record. Missing records are not passed.
    fn is_passed(&self, key: &ProgressKey) -> bool {
        self.lookup(key).is_some_and(|r| r.passed)
    }

    /// Whether `key` has any record.
    fn has_record(&self, key: &ProgressKey) -> bool {
        self.lookup(key).is_some()
    }
}

/// Writable progress store.
///
/// Implementations serialize concurrent writers themselves, so `set` takes
/// `&self`.
pub trait ProgressStore: ProgressLookup + Send + Sync {
    /// Insert or replace the record for `key`.
    fn set(&self, key: ProgressKey, record: ProgressRecord);

    /// All recorded entries, in unspecified order.
    fn entries(&self) -> Vec<(ProgressKey, ProgressRecord)>;
}

impl ProgressLookup for HashMap<ProgressKey, ProgressRecord> {
    fn lookup(&self, key: &ProgressKey) -> Option<ProgressRecord> {
        self.get(key).cloned()
    }
}

impl<T: ProgressLookup + ?Sized> ProgressLookup for &T {
    fn lookup(&self, key: &ProgressKey) -> Option<ProgressRecord> {
        (**self).lookup(key)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
