//! Compiled sequence types.
//!
//! A [`CompiledSequence`] is what a learner steps through: the topic's nodes
//! with examples and quizzes grouped, each step tagged with the section
//! header it belongs to, and synthetic completion cards injected between
//! modules. Everything here is a pure derivation of a [`Topic`] and is
//! recomputed rather than edited.
//!
//! [`Topic`]: lesson_core::content::Topic

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use lesson_core::content::{ContentNode, TopicSummary};
use lesson_core::ids::{NodeId, TopicId};
use lesson_settings::GatingSettings;
use serde::Serialize;

use crate::constants::{MIN_BATCH_SIZE, NEXT_TOPIC_TITLE, QUIZ_GROUP_TITLE, REQUIRED_PASSES};

/// Ordering key of a compiled step.
///
/// Real nodes sit at their source index. Injected steps sort immediately
/// before the real node at `before`; trailing injected steps use the node
/// count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Position {
    /// Synthetic step placed before source index `before`.
    Injected {
        /// Source index this step precedes.
        before: usize,
    },
    /// Real node (or group starting) at this source index.
    Node(usize),
}

impl Position {
    /// Source index this position is anchored to.
    pub fn index(self) -> usize {
        match self {
            Self::Injected { before } => before,
            Self::Node(index) => index,
        }
    }

    /// Whether this is a synthetic step.
    pub fn is_injected(self) -> bool {
        matches!(self, Self::Injected { .. })
    }

    fn sort_key(self) -> (usize, u8) {
        match self {
            Self::Injected { before } => (before, 0),
            Self::Node(index) => (index, 1),
        }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Back-reference to a section header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRef {
    /// Header node ID, when authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// Header title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Header description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source index of the header node. Lock entries are keyed by this.
    pub position: usize,
}

impl HeaderRef {
    /// Reference to a header node.
    pub fn of(node: &ContentNode) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            position: node.position,
        }
    }

    /// Whether the header's ID equals `target`.
    pub fn has_id(&self, target: &str) -> bool {
        self.id.as_ref().is_some_and(|id| id.as_str() == target)
    }
}

/// Kind of a compiled step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// A section header node.
    SectionHeader,
    /// A standalone explanation node.
    Explanation,
    /// A maximal run of example nodes.
    ExampleGroup,
    /// A maximal run of quiz nodes.
    QuizGroup,
    /// A checkpoint node.
    Checkpoint,
    /// A standalone node of an unrecognized kind.
    Other,
    /// Synthetic card closing a module.
    ModuleCompletion,
    /// Synthetic card pointing at the next topic in the catalog.
    NextTopicCard,
}

impl StepKind {
    /// Whether the step holds a group of nodes.
    pub fn is_group(self) -> bool {
        matches!(self, Self::ExampleGroup | Self::QuizGroup)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SectionHeader => "SectionHeader",
            Self::Explanation => "Explanation",
            Self::ExampleGroup => "ExampleGroup",
            Self::QuizGroup => "QuizGroup",
            Self::Checkpoint => "Checkpoint",
            Self::Other => "Other",
            Self::ModuleCompletion => "ModuleCompletion",
            Self::NextTopicCard => "NextTopicCard",
        };
        f.write_str(label)
    }
}

/// Kind-specific content of a step.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum StepPayload {
    /// The node itself (headers, explanations, checkpoints, unknown kinds).
    Node {
        /// The node.
        node: ContentNode,
    },
    /// Grouped nodes in source order (never empty).
    Group {
        /// Group members.
        members: Vec<ContentNode>,
    },
    /// Module closed, and the module that follows (if any).
    ModuleCompletion {
        /// The module just finished.
        completed: HeaderRef,
        /// The next module in this topic.
        #[serde(skip_serializing_if = "Option::is_none")]
        next: Option<HeaderRef>,
    },
    /// The next topic in the catalog.
    NextTopic {
        /// That topic.
        topic: TopicSummary,
    },
}

/// One navigable step.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledStep {
    /// Step kind.
    pub kind: StepKind,
    /// Ordering key.
    pub position: Position,
    /// The section header governing this step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_header: Option<HeaderRef>,
    /// Kind-specific content.
    pub payload: StepPayload,
}

impl CompiledStep {
    /// The node of a standalone step.
    pub fn node(&self) -> Option<&ContentNode> {
        match &self.payload {
            StepPayload::Node { node } => Some(node),
            _ => None,
        }
    }

    /// Members of a group step; empty for everything else.
    pub fn members(&self) -> &[ContentNode] {
        match &self.payload {
            StepPayload::Group { members } => members,
            _ => &[],
        }
    }

    /// Every source node this step carries.
    pub fn content_nodes(&self) -> impl Iterator<Item = &ContentNode> {
        self.node().into_iter().chain(self.members())
    }

    /// Direct ID of a standalone step.
    pub fn id(&self) -> Option<&NodeId> {
        self.node().and_then(|n| n.id.as_ref())
    }

    /// Index of the group member with ID `target`.
    pub fn member_index(&self, target: &str) -> Option<usize> {
        self.members().iter().position(|m| m.has_id(target))
    }

    /// Display title.
    pub fn title(&self) -> Option<&str> {
        match &self.payload {
            StepPayload::Node { node } => node.title.as_deref(),
            StepPayload::Group { members } => match self.kind {
                StepKind::QuizGroup => Some(QUIZ_GROUP_TITLE),
                _ => members.first().and_then(|m| m.title.as_deref()),
            },
            StepPayload::ModuleCompletion { completed, .. } => completed.title.as_deref(),
            StepPayload::NextTopic { .. } => Some(NEXT_TOPIC_TITLE),
        }
    }

    /// Source index of the header this step is gated by.
    pub fn gating_position(&self) -> Option<usize> {
        self.active_header.as_ref().map(|h| h.position)
    }
}

/// One line per step: kind, position, header, and member IDs.
impl fmt::Display for CompiledStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Position::Node(index) => write!(f, "{:>3}  {}", index, self.kind)?,
            Position::Injected { before } => write!(f, "{:>3}- {}", before, self.kind)?,
        }
        match &self.payload {
            StepPayload::Node { node } => {
                if let Some(id) = &node.id {
                    write!(f, "({id})")?;
                }
            }
            StepPayload::Group { members } => {
                let ids: Vec<&str> = members
                    .iter()
                    .map(|m| m.id.as_ref().map_or("_", NodeId::as_str))
                    .collect();
                write!(f, "[{}]", ids.join(","))?;
            }
            StepPayload::ModuleCompletion { completed, next } => {
                let name = |h: &HeaderRef| h.id.as_ref().map_or("_", NodeId::as_str).to_owned();
                let next = next.as_ref().map_or_else(|| "end".to_owned(), name);
                write!(f, "({}->{next})", name(completed))?;
            }
            StepPayload::NextTopic { topic } => write!(f, "({})", topic.id)?,
        }
        if let Some(header) = &self.active_header {
            write!(f, " @{}", header.id.as_ref().map_or("_", NodeId::as_str))?;
        }
        Ok(())
    }
}

/// Ordered steps for one topic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledSequence {
    /// Topic the steps were compiled from.
    pub topic_id: TopicId,
    /// Steps in navigation order.
    pub steps: Vec<CompiledStep>,
}

impl CompiledSequence {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    pub fn get(&self, index: usize) -> Option<&CompiledStep> {
        self.steps.get(index)
    }

    /// Iterate over steps.
    pub fn iter(&self) -> std::slice::Iter<'_, CompiledStep> {
        self.steps.iter()
    }

    /// Index of the first step with this exact position.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.steps.iter().position(|s| s.position == position)
    }
}

impl fmt::Display for CompiledSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "#{i:<3} {step}")?;
        }
        Ok(())
    }
}

/// Gating state of one section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    /// Whether the section is closed to the learner.
    pub locked: bool,
    /// Passed quizzes in the preceding batch.
    pub achieved: usize,
    /// Passes needed to unlock.
    pub required: usize,
    /// Quizzes in the preceding batch.
    pub total: usize,
}

impl LockEntry {
    /// Entry for a batch with `achieved` of `total` passed.
    pub fn evaluate(achieved: usize, total: usize, required: usize) -> Self {
        Self {
            locked: achieved < required,
            achieved,
            required,
            total,
        }
    }
}

/// Lock entries keyed by the source position of the gated header.
pub type LockMap = BTreeMap<usize, LockEntry>;

/// Thresholds for [`compute_locks`](crate::locks::compute_locks).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatingPolicy {
    /// Batches shorter than this never lock.
    pub min_batch_size: usize,
    /// Fixed pass count to unlock, independent of batch size.
    pub required_passes: usize,
}

impl Default for GatingPolicy {
    fn default() -> Self {
        Self {
            min_batch_size: MIN_BATCH_SIZE,
            required_passes: REQUIRED_PASSES,
        }
    }
}

impl From<&GatingSettings> for GatingPolicy {
    fn from(settings: &GatingSettings) -> Self {
        Self {
            min_batch_size: settings.min_batch_size,
            required_passes: settings.required_passes,
        }
    }
}

/// Cursor state of one navigation session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// Index of the current step.
    pub cursor: usize,
    /// Member to pre-select inside the current group step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_sub_index: Option<usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_sorts_before_node_at_same_index() {
        let mut positions = vec![
            Position::Node(3),
            Position::Injected { before: 3 },
            Position::Node(2),
            Position::Injected { before: 5 },
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                Position::Node(2),
                Position::Injected { before: 3 },
                Position::Node(3),
                Position::Injected { before: 5 },
            ]
        );
    }

    #[test]
    fn position_accessors() {
        assert_eq!(Position::Injected { before: 4 }.index(), 4);
        assert!(Position::Injected { before: 4 }.is_injected());
        assert!(!Position::Node(4).is_injected());
    }

    #[test]
    fn lock_entry_uses_fixed_threshold() {
        assert_eq!(
            LockEntry::evaluate(3, 6, 8),
            LockEntry {
                locked: true,
                achieved: 3,
                required: 8,
                total: 6
            }
        );
        assert!(!LockEntry::evaluate(8, 10, 8).locked);
    }

    #[test]
    fn gating_policy_from_settings() {
        let settings = GatingSettings {
            min_batch_size: 3,
            required_passes: 4,
        };
        let policy = GatingPolicy::from(&settings);
        assert_eq!(policy.min_batch_size, 3);
        assert_eq!(policy.required_passes, 4);
        assert_eq!(GatingPolicy::default().required_passes, 8);
    }

    #[test]
    fn step_accessors() {
        let quiz_group = CompiledStep {
            kind: StepKind::QuizGroup,
            position: Position::Node(2),
            active_header: None,
            payload: StepPayload::Group {
                members: vec![
                    ContentNode::quiz("q1", "1").with_title("First"),
                    ContentNode::quiz("q2", "2"),
                ],
            },
        };
        assert_eq!(quiz_group.member_index("q2"), Some(1));
        assert_eq!(quiz_group.member_index("q3"), None);
        assert!(quiz_group.id().is_none());
        assert_eq!(quiz_group.title(), Some(QUIZ_GROUP_TITLE));
        assert_eq!(quiz_group.content_nodes().count(), 2);
        assert!(quiz_group.kind.is_group());
    }

    #[test]
    fn step_display_line() {
        let header = HeaderRef::of(&ContentNode::header("intro", "Intro"));
        let step = CompiledStep {
            kind: StepKind::ModuleCompletion,
            position: Position::Injected { before: 6 },
            active_header: Some(header.clone()),
            payload: StepPayload::ModuleCompletion {
                completed: header,
                next: None,
            },
        };
        assert_eq!(step.to_string(), "  6- ModuleCompletion(intro->end) @intro");
    }
}
