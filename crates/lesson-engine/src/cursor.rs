//! Navigation session state.
//!
//! A [`NavigationCursor`] owns one compiled sequence, its lock map, and the
//! learner's position in it. Every transition is total: moves past either end
//! are no-ops and invalid jumps are rejected without changing state.
//!
//! The host recomputes the sequence and locks whenever the topic or progress
//! changes and hands both to [`NavigationCursor::refresh`], which swaps them
//! in before clamping the cursor.

use lesson_core::ids::SessionId;
use tracing::{debug, warn};

use crate::resolver::locate;
use crate::types::{CompiledSequence, CompiledStep, LockEntry, LockMap, NavigationState};

/// One learner's walk through one topic.
#[derive(Clone, Debug)]
pub struct NavigationCursor {
    session_id: SessionId,
    sequence: CompiledSequence,
    locks: LockMap,
    privileged: bool,
    state: NavigationState,
}

impl NavigationCursor {
    /// Start a session at the first step.
    ///
    /// `privileged` sessions ignore every lock.
    pub fn new(sequence: CompiledSequence, locks: LockMap, privileged: bool) -> Self {
        let session_id = SessionId::new();
        debug!(
            session_id = %session_id,
            topic_id = %sequence.topic_id,
            steps = sequence.len(),
            privileged,
            "navigation session started"
        );
        Self {
            session_id,
            sequence,
            locks,
            privileged,
            state: NavigationState::default(),
        }
    }

    /// Session ID for log correlation.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The sequence being navigated.
    pub fn sequence(&self) -> &CompiledSequence {
        &self.sequence
    }

    /// Current lock map.
    pub fn locks(&self) -> &LockMap {
        &self.locks
    }

    /// Whether locks are bypassed.
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Cursor and pending sub index.
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Current step index (0 on an empty sequence).
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// Current step, or `None` on an empty sequence.
    pub fn current(&self) -> Option<&CompiledStep> {
        self.sequence.get(self.state.cursor)
    }

    /// Advance one step. Returns whether the cursor moved.
    ///
    /// Locked steps are not skipped; the host renders the lock instead.
    pub fn go_next(&mut self) -> bool {
        if self.state.cursor + 1 >= self.sequence.len() {
            return false;
        }
        self.state.cursor += 1;
        self.state.pending_sub_index = None;
        true
    }

    /// Step back one. Returns whether the cursor moved.
    pub fn go_back(&mut self) -> bool {
        if self.state.cursor == 0 {
            return false;
        }
        self.state.cursor -= 1;
        self.state.pending_sub_index = None;
        true
    }

    /// Move to `index`, pre-selecting `sub_index` inside a group.
    ///
    /// Out-of-range indices are rejected and leave the state untouched.
    pub fn jump_to(&mut self, index: usize, sub_index: Option<usize>) -> bool {
        if index >= self.sequence.len() {
            return false;
        }
        self.state = NavigationState {
            cursor: index,
            pending_sub_index: sub_index,
        };
        true
    }

    /// Resolve `target` and move there. Unknown targets leave the state
    /// untouched.
    pub fn jump_to_deep_link(&mut self, target: &str) -> bool {
        match locate(&self.sequence, target) {
            Some(resolution) => {
                let sub_index = self
                    .sequence
                    .get(resolution.step)
                    .filter(|s| s.kind.is_group())
                    .map(|_| resolution.sub_index);
                self.jump_to(resolution.step, sub_index)
            }
            None => {
                warn!(
                    session_id = %self.session_id,
                    topic_id = %self.sequence.topic_id,
                    link = target,
                    "deep link target not found"
                );
                false
            }
        }
    }

    /// The lock gating `step`, if it is locked and the session is not
    /// privileged.
    pub fn effective_lock(&self, step: &CompiledStep) -> Option<&LockEntry> {
        if self.privileged {
            return None;
        }
        let position = step.gating_position()?;
        self.locks.get(&position).filter(|entry| entry.locked)
    }

    /// Lock gating the current step.
    pub fn current_lock(&self) -> Option<&LockEntry> {
        self.current().and_then(|step| self.effective_lock(step))
    }

    /// Whether Next should be offered: not at the end and not gated.
    pub fn can_go_next(&self) -> bool {
        self.state.cursor + 1 < self.sequence.len() && self.current_lock().is_none()
    }

    /// Swap in a recomputed sequence and lock map, then clamp the cursor.
    pub fn refresh(&mut self, sequence: CompiledSequence, locks: LockMap) {
        self.sequence = sequence;
        self.locks = locks;
        let last = self.sequence.len().saturating_sub(1);
        if self.state.cursor > last {
            debug!(
                session_id = %self.session_id,
                from = self.state.cursor,
                to = last,
                "cursor clamped after refresh"
            );
            self.state = NavigationState {
                cursor: last,
                pending_sub_index: None,
            };
        }
    }

    /// Take the pending sub index, leaving `None` behind.
    ///
    /// The host calls this once when rendering a group step.
    pub fn take_pending_sub_index(&mut self) -> Option<usize> {
        self.state.pending_sub_index.take()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::locks::compute_locks;
    use crate::types::{GatingPolicy, StepKind};
    use lesson_core::content::{ContentNode, Topic};
    use lesson_core::logging::capture_logs;
    use lesson_progress::MemoryProgressStore;
    use tracing::Level;

    /// Header, six quizzes, then a gated second module.
    fn gated_topic() -> Topic {
        let mut nodes = vec![ContentNode::header("intro", "Intro")];
        nodes.extend((0..6).map(|i| ContentNode::quiz(format!("q{i}"), "1")));
        nodes.push(ContentNode::header("part2", "Part 2"));
        nodes.push(ContentNode::explanation("p2a"));
        Topic::new("p5", "Primary 5", nodes)
    }

    fn cursor_for(topic: &Topic, privileged: bool) -> NavigationCursor {
        let store = MemoryProgressStore::new();
        let locks = compute_locks(topic, &store, &GatingPolicy::default());
        NavigationCursor::new(compile(topic, None), locks, privileged)
    }

    #[test]
    fn next_and_back_stop_at_bounds() {
        let mut cursor = cursor_for(&gated_topic(), false);
        assert!(!cursor.go_back());
        assert_eq!(cursor.cursor(), 0);

        let len = cursor.sequence().len();
        for _ in 0..len + 3 {
            let _ = cursor.go_next();
        }
        assert_eq!(cursor.cursor(), len - 1);
        assert!(!cursor.go_next());
        assert!(cursor.go_back());
        assert_eq!(cursor.cursor(), len - 2);
    }

    #[test]
    fn empty_sequence_is_total() {
        let mut cursor = cursor_for(&Topic::new("t", "T", vec![]), false);
        assert!(cursor.current().is_none());
        assert!(!cursor.go_next());
        assert!(!cursor.go_back());
        assert!(!cursor.jump_to(0, None));
        assert!(!cursor.can_go_next());
        assert_eq!(cursor.cursor(), 0);
    }

    #[test]
    fn jump_rejects_out_of_range() {
        let mut cursor = cursor_for(&gated_topic(), false);
        assert!(cursor.jump_to(1, Some(3)));
        assert_eq!(
            cursor.state(),
            NavigationState {
                cursor: 1,
                pending_sub_index: Some(3)
            }
        );
        assert!(!cursor.jump_to(99, None));
        assert_eq!(cursor.cursor(), 1);
    }

    #[test]
    fn deep_link_selects_group_member() {
        let mut cursor = cursor_for(&gated_topic(), false);
        assert!(cursor.jump_to_deep_link("q4"));
        assert_eq!(cursor.current().unwrap().kind, StepKind::QuizGroup);
        assert_eq!(cursor.take_pending_sub_index(), Some(4));
        assert_eq!(cursor.take_pending_sub_index(), None);
    }

    #[test]
    fn deep_link_to_standalone_step_has_no_sub_index() {
        let mut cursor = cursor_for(&gated_topic(), false);
        assert!(cursor.jump_to_deep_link("part2"));
        assert_eq!(cursor.current().unwrap().kind, StepKind::SectionHeader);
        assert_eq!(cursor.state().pending_sub_index, None);
    }

    #[test]
    fn unknown_deep_link_warns_and_keeps_state() {
        let (logs, _guard) = capture_logs();
        let mut cursor = cursor_for(&gated_topic(), false);
        assert!(cursor.jump_to(1, None));

        assert!(!cursor.jump_to_deep_link("nowhere"));
        assert_eq!(cursor.cursor(), 1);
        assert!(logs.has_event(Level::WARN, "deep link target not found"));
        assert_eq!(
            logs.field_of("deep link target not found", "link").as_deref(),
            Some("nowhere")
        );
    }

    #[test]
    fn moving_clears_pending_sub_index() {
        let mut cursor = cursor_for(&gated_topic(), false);
        assert!(cursor.jump_to(1, Some(2)));
        assert!(cursor.go_next());
        assert_eq!(cursor.state().pending_sub_index, None);
    }

    #[test]
    fn locked_section_gates_unless_privileged() {
        let topic = gated_topic();
        let mut learner = cursor_for(&topic, false);
        assert!(learner.jump_to_deep_link("part2"));
        let lock = learner.current_lock().copied().unwrap();
        assert_eq!((lock.achieved, lock.required, lock.total), (0, 8, 6));
        assert!(!learner.can_go_next());
        // Next is never refused by the cursor itself
        assert!(learner.go_next());
        assert!(learner.current_lock().is_some());

        let mut admin = cursor_for(&topic, true);
        assert!(admin.jump_to_deep_link("part2"));
        assert!(admin.current_lock().is_none());
        assert!(admin.can_go_next());
    }

    #[test]
    fn completion_card_uses_completed_module_lock() {
        let cursor = cursor_for(&gated_topic(), false);
        let completion = cursor
            .sequence()
            .iter()
            .find(|s| s.kind == StepKind::ModuleCompletion)
            .unwrap();
        // the card closes "intro", which has no lock
        assert!(cursor.effective_lock(completion).is_none());
    }

    #[test]
    fn refresh_replaces_then_clamps() {
        let topic = gated_topic();
        let mut cursor = cursor_for(&topic, false);
        let last = cursor.sequence().len() - 1;
        assert!(cursor.jump_to(last, Some(1)));

        let shorter = Topic::new("p5", "Primary 5", vec![ContentNode::explanation("only")]);
        cursor.refresh(compile(&shorter, None), LockMap::new());
        assert_eq!(cursor.cursor(), 0);
        assert_eq!(cursor.state().pending_sub_index, None);
        assert!(cursor.locks().is_empty());
    }

    #[test]
    fn refresh_unlocks_after_progress() {
        let topic = gated_topic();
        let store = MemoryProgressStore::new();
        let mut cursor = cursor_for(&topic, false);
        assert!(cursor.jump_to_deep_link("part2"));
        assert!(cursor.current_lock().is_some());

        let _ = store.mark_topic_complete(&topic);
        let policy = GatingPolicy {
            min_batch_size: 5,
            required_passes: 6,
        };
        cursor.refresh(compile(&topic, None), compute_locks(&topic, &store, &policy));
        assert!(cursor.current_lock().is_none());
        assert_eq!(cursor.current().unwrap().kind, StepKind::SectionHeader);
    }
}
