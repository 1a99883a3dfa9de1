//! Section gating.
//!
//! Quizzes collected since the previous header form a batch; the next header
//! closes it. A batch of at least `min_batch_size` quizzes gates the section
//! that follows until `required_passes` of them are passed. Privilege is the
//! caller's concern (see [`NavigationCursor`](crate::cursor::NavigationCursor)).

use lesson_core::content::{NodeKind, Topic};
use lesson_core::progress::{ProgressKey, ProgressLookup};
use tracing::debug;

use crate::types::{GatingPolicy, LockEntry, LockMap};

/// Compute lock entries for every gated header in `topic`.
///
/// Entries are keyed by the closing header's source position. Missing
/// progress records count as not passed. Quizzes after the last header never
/// gate anything.
pub fn compute_locks<P>(topic: &Topic, progress: &P, policy: &GatingPolicy) -> LockMap
where
    P: ProgressLookup + ?Sized,
{
    let mut locks = LockMap::new();
    let mut batch: Vec<usize> = Vec::new();

    for node in &topic.nodes {
        match node.kind {
            NodeKind::Quiz => batch.push(node.position),
            NodeKind::SectionHeader if node.position > 0 => {
                if batch.len() >= policy.min_batch_size {
                    let achieved = batch
                        .iter()
                        .filter(|&&position| {
                            progress.is_passed(&ProgressKey::quiz(topic.id.clone(), position))
                        })
                        .count();
                    let entry = LockEntry::evaluate(achieved, batch.len(), policy.required_passes);
                    let _ = locks.insert(node.position, entry);
                }
                batch.clear();
            }
            _ => {}
        }
    }

    debug!(
        topic_id = %topic.id,
        gated = locks.len(),
        locked = locks.values().filter(|e| e.locked).count(),
        "computed locks"
    );
    locks
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
