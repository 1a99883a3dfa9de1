//! Shared in-memory progress store.
//!
//! [`MemoryProgressStore`] is cheap to clone; clones share the same records.
//! Writers are serialized by a `parking_lot::RwLock`, readers proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::Arc;

use lesson_core::content::Topic;
use lesson_core::ids::{NodeId, TopicId};
use lesson_core::progress::{ProgressKey, ProgressLookup, ProgressRecord, ProgressStore};
use parking_lot::RwLock;
use tracing::debug;

/// Pass ratio used when none is configured.
pub const DEFAULT_PASS_RATIO: f64 = 0.8;

/// Thread-safe progress store backed by a `HashMap`.
#[derive(Clone, Debug)]
pub struct MemoryProgressStore {
    records: Arc<RwLock<HashMap<ProgressKey, ProgressRecord>>>,
    pass_ratio: f64,
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProgressStore {
    /// Empty store grading with [`DEFAULT_PASS_RATIO`].
    pub fn new() -> Self {
        Self::with_pass_ratio(DEFAULT_PASS_RATIO)
    }

    /// Empty store grading with `pass_ratio`.
    pub fn with_pass_ratio(pass_ratio: f64) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            pass_ratio,
        }
    }

    /// Ratio an attempt must reach to pass.
    pub fn pass_ratio(&self) -> f64 {
        self.pass_ratio
    }

    /// Grade and store an attempt under `key`.
    pub fn record(&self, key: ProgressKey, score: f64, max_score: f64) -> ProgressRecord {
        let record = ProgressRecord::graded(score, max_score, self.pass_ratio);
        debug!(%key, score, max_score, passed = record.passed, "recorded attempt");
        self.set(key, record.clone());
        record
    }

    /// Grade and store the result of the quiz at `position` in `topic_id`.
    pub fn record_quiz_result(
        &self,
        topic_id: impl Into<TopicId>,
        position: usize,
        score: f64,
        max_score: f64,
    ) -> ProgressRecord {
        self.record(ProgressKey::quiz(topic_id, position), score, max_score)
    }

    /// Mark a checkpoint (or any section) complete.
    pub fn mark_checkpoint_complete(&self, id: impl Into<NodeId>) -> ProgressRecord {
        let record = ProgressRecord::full_marks();
        self.set(ProgressKey::completion(id), record.clone());
        record
    }

    /// Mark every quiz in `topic` passed with full marks.
    ///
    /// Quizzes never attempted are recorded too. Returns the number of
    /// quizzes written.
    pub fn mark_topic_complete(&self, topic: &Topic) -> usize {
        let mut records = self.records.write();
        let mut written = 0;
        for quiz in topic.quizzes() {
            let _ = records.insert(
                ProgressKey::quiz(topic.id.clone(), quiz.position),
                ProgressRecord::full_marks(),
            );
            written += 1;
        }
        debug!(topic_id = %topic.id, written, "marked topic complete");
        written
    }

    /// Percentage of recorded quiz attempts in `topic_id` that passed.
    ///
    /// Only attempted quizzes count toward the denominator. A topic with no
    /// recorded quizzes is 0%.
    pub fn topic_completion_percent(&self, topic_id: &str) -> u32 {
        let records = self.records.read();
        let (total, passed) = records
            .iter()
            .filter(|(key, _)| key.is_quiz_in(topic_id))
            .fold((0_u32, 0_u32), |(total, passed), (_, record)| {
                (total + 1, passed + u32::from(record.passed))
            });
        if total == 0 {
            return 0;
        }
        (f64::from(passed) / f64::from(total) * 100.0).round() as u32
    }

    /// Remove the record for `key`, returning it.
    pub fn remove(&self, key: &ProgressKey) -> Option<ProgressRecord> {
        self.records.write().remove(key)
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store has no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Point-in-time copy of all records.
    pub fn to_map(&self) -> HashMap<ProgressKey, ProgressRecord> {
        self.records.read().clone()
    }
}

impl ProgressLookup for MemoryProgressStore {
    fn lookup(&self, key: &ProgressKey) -> Option<ProgressRecord> {
        self.records.read().get(key).cloned()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn set(&self, key: ProgressKey, record: ProgressRecord) {
        let _ = self.records.write().insert(key, record);
    }

    fn entries(&self) -> Vec<(ProgressKey, ProgressRecord)> {
        self.records
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
