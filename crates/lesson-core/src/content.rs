//! Authored content model.
//!
//! - [`ContentNode`]: one authored unit (header, explanation, example, quiz, checkpoint)
//! - [`Topic`]: an ordered list of nodes with positions assigned on construction
//! - [`TopicSummary`]: the id/title pair used for "up next" cards
//!
//! The JSON wire format is the legacy `topics.json` layout: a topic carries its
//! nodes under `sections`, and each node names its kind in a `type` tag
//! (`section-header`, `explanation`, `example`, `quiz`, `checkpoint`). Any
//! other tag loads as [`NodeKind::Other`] so one unfamiliar node never makes
//! a whole catalog unreadable.
//! Authored fields this crate does not interpret are preserved in
//! [`ContentNode::extra`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{NodeId, TopicId};

/// Kind tag of an authored node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Opens a module; everything up to the next header belongs to it.
    SectionHeader,
    /// Free-form teaching text.
    Explanation,
    /// Worked example. Consecutive examples are grouped into one step.
    Example,
    /// Practice question. Consecutive quizzes are grouped into one step.
    Quiz,
    /// Explicit completion marker for a section.
    Checkpoint,
    /// Any tag this crate does not know. Serializes back as `other`.
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Whether consecutive nodes of this kind collapse into a group step.
    pub fn is_groupable(self) -> bool {
        matches!(self, Self::Example | Self::Quiz)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::SectionHeader => "section-header",
            Self::Explanation => "explanation",
            Self::Example => "example",
            Self::Quiz => "quiz",
            Self::Checkpoint => "checkpoint",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// One authored unit of lesson content.
///
/// `position` is the node's index in its topic's source list. It is not part
/// of the wire format; [`Topic`] assigns it when the topic is built or
/// deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Stable author-assigned ID, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description shown under the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Body text (explanations, checkpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Expected answer for a quiz. Authors write both strings and numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Value>,
    /// Hint or solution steps for a quiz.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Value>,
    /// Optional lesson video for a header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Index in the topic's source list.
    #[serde(skip)]
    pub position: usize,
    /// Authored fields not interpreted by the engine.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ContentNode {
    /// Create a bare node of the given kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            title: None,
            description: None,
            content: None,
            answer: None,
            steps: Vec::new(),
            video_url: None,
            position: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Section header with an ID and title.
    #[must_use]
    pub fn header(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self::new(NodeKind::SectionHeader)
            .with_id(id)
            .with_title(title)
    }

    /// Explanation with an ID.
    #[must_use]
    pub fn explanation(id: impl Into<NodeId>) -> Self {
        Self::new(NodeKind::Explanation).with_id(id)
    }

    /// Example with an ID.
    #[must_use]
    pub fn example(id: impl Into<NodeId>) -> Self {
        Self::new(NodeKind::Example).with_id(id)
    }

    /// Quiz with an ID and a string answer.
    #[must_use]
    pub fn quiz(id: impl Into<NodeId>, answer: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Quiz).with_id(id);
        node.answer = Some(Value::String(answer.into()));
        node
    }

    /// Checkpoint with an ID.
    #[must_use]
    pub fn checkpoint(id: impl Into<NodeId>) -> Self {
        Self::new(NodeKind::Checkpoint).with_id(id)
    }

    /// Set the ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this node's ID equals `target`.
    pub fn has_id(&self, target: &str) -> bool {
        self.id.as_ref().is_some_and(|id| id.as_str() == target)
    }

    /// Whether the title contains `needle` (case-sensitive).
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.as_deref().is_some_and(|t| t.contains(needle))
    }

    /// Quiz answer rendered as text (numbers are formatted, strings verbatim).
    pub fn answer_text(&self) -> Option<String> {
        match self.answer.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// A topic: an ordered list of authored nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TopicDocument")]
pub struct Topic {
    /// Topic ID.
    pub id: TopicId,
    /// Display title.
    pub title: String,
    /// Nodes in authored order. `nodes[i].position == i`.
    #[serde(rename = "sections")]
    pub nodes: Vec<ContentNode>,
    /// Authored fields not interpreted by the engine.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Wire shape of a topic before positions are assigned.
#[derive(Deserialize)]
struct TopicDocument {
    id: TopicId,
    title: String,
    #[serde(default)]
    sections: Vec<ContentNode>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

impl From<TopicDocument> for Topic {
    fn from(doc: TopicDocument) -> Self {
        let mut topic = Self::new(doc.id, doc.title, doc.sections);
        topic.extra = doc.extra;
        topic
    }
}

impl Topic {
    /// Build a topic, assigning each node its source position.
    #[must_use]
    pub fn new(id: impl Into<TopicId>, title: impl Into<String>, nodes: Vec<ContentNode>) -> Self {
        let nodes = nodes
            .into_iter()
            .enumerate()
            .map(|(position, mut node)| {
                node.position = position;
                node
            })
            .collect();
        Self {
            id: id.into(),
            title: title.into(),
            nodes,
            extra: serde_json::Map::new(),
        }
    }

    /// Lightweight id/title pair for this topic.
    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    /// Find a node by ID.
    pub fn node(&self, id: &str) -> Option<&ContentNode> {
        self.nodes.iter().find(|n| n.has_id(id))
    }

    /// Iterate over quiz nodes in authored order.
    pub fn quizzes(&self) -> impl Iterator<Item = &ContentNode> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Quiz)
    }

    /// Whether the topic has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// ID and title of a topic, as shown on an "up next" card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Topic ID.
    pub id: TopicId,
    /// Display title.
    pub title: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
