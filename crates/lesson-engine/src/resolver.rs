//! Deep-link resolution.
//!
//! Maps an opaque target token (URL `?section=`, a menu click, "back to
//! module") onto a step of a [`CompiledSequence`]. Each step is tested
//! against four rules in order and the first matching step wins:
//!
//! 1. the step's own node ID (headers, explanations, checkpoints)
//! 2. the ID of the step's active header
//! 3. a member ID of an example group
//! 4. a member ID of a quiz group
//!
//! Review tokens are routed elsewhere before reaching this module (see
//! [`is_review_request`](crate::review::is_review_request)).

use serde::Serialize;

use crate::types::{CompiledSequence, CompiledStep, StepKind};

/// Where a target landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Step index.
    pub step: usize,
    /// Member to pre-select when the step is a group.
    pub sub_index: usize,
}

/// Find the step and group member for `target`.
pub fn locate(sequence: &CompiledSequence, target: &str) -> Option<Resolution> {
    if target.is_empty() {
        return None;
    }
    sequence
        .iter()
        .enumerate()
        .find_map(|(step, s)| match_step(s, target).map(|sub_index| Resolution { step, sub_index }))
}

/// Step index for `target`, or `None` when nothing matches.
pub fn resolve(sequence: &CompiledSequence, target: &str) -> Option<usize> {
    locate(sequence, target).map(|r| r.step)
}

fn match_step(step: &CompiledStep, target: &str) -> Option<usize> {
    if step.id().is_some_and(|id| id.as_str() == target) {
        return Some(0);
    }
    if step.active_header.as_ref().is_some_and(|h| h.has_id(target)) {
        return Some(0);
    }
    match step.kind {
        StepKind::ExampleGroup | StepKind::QuizGroup => step.member_index(target),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
