//! Learner dashboard statistics.

use lesson_core::progress::{ProgressKey, ProgressRecord, ProgressStore};
use serde::{Serialize, Serializer};

/// Recent entries shown on the dashboard.
const RECENT_LIMIT: usize = 5;

/// Rank earned from the number of passed quizzes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rank {
    /// Fewer than 5 passed.
    Novice,
    /// 5 to 9 passed.
    Apprentice,
    /// 10 to 19 passed.
    Scholar,
    /// 20 or more passed.
    Grandmaster,
}

impl Rank {
    /// Rank for `passed` quizzes.
    pub fn from_passed(passed: usize) -> Self {
        match passed {
            0..5 => Self::Novice,
            5..10 => Self::Apprentice,
            10..20 => Self::Scholar,
            _ => Self::Grandmaster,
        }
    }
}

/// One entry of the recent-activity list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecentAttempt {
    /// Record key, serialized in its legacy string form.
    #[serde(serialize_with = "legacy_key")]
    pub key: ProgressKey,
    /// The record.
    pub record: ProgressRecord,
}

fn legacy_key<S: Serializer>(key: &ProgressKey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

/// Totals and recent activity across all topics.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSummary {
    /// Quizzes with any recorded attempt.
    pub attempted: usize,
    /// Quizzes whose latest attempt passed.
    pub passed: usize,
    /// `passed / attempted`, or 0 when nothing was attempted.
    pub accuracy: f64,
    /// Rank derived from `passed`.
    pub rank: Rank,
    /// Most recent records first, quizzes and completions alike.
    pub recent: Vec<RecentAttempt>,
}

impl LearnerSummary {
    /// Summarize everything in `store`.
    pub fn from_store(store: &dyn ProgressStore) -> Self {
        let mut entries = store.entries();
        let (attempted, passed) = entries
            .iter()
            .filter(|(key, _)| matches!(key, ProgressKey::Quiz { .. }))
            .fold((0, 0), |(attempted, passed), (_, record)| {
                (attempted + 1, passed + usize::from(record.passed))
            });

        entries.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp).then_with(|| a.0.cmp(&b.0)));
        let recent = entries
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|(key, record)| RecentAttempt { key, record })
            .collect();

        let accuracy = if attempted == 0 {
            0.0
        } else {
            passed as f64 / attempted as f64
        };

        Self {
            attempted,
            passed,
            accuracy,
            rank: Rank::from_passed(passed),
            recent,
        }
    }
}
