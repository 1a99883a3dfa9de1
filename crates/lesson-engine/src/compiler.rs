//! Topic compiler.
//!
//! [`compile`] turns a topic's authored nodes into the linear sequence a
//! learner steps through, in one left-to-right fold:
//!
//! - consecutive examples (or quizzes) collapse into one group step
//! - every step is tagged with the section header governing it
//! - a [`StepKind::ModuleCompletion`] card is injected before each header
//!   that closes a module with content, and after the last such module
//! - a [`StepKind::NextTopicCard`] is appended when a following topic exists
//!
//! Header attachment is asymmetric: groups and explanations keep the current
//! header active, a checkpoint (or a node of unrecognized kind) ends it.

use lesson_core::catalog::TopicCatalog;
use lesson_core::content::{ContentNode, NodeKind, Topic, TopicSummary};
use lesson_core::errors::Result;
use tracing::debug;

use crate::types::{CompiledSequence, CompiledStep, HeaderRef, Position, StepKind, StepPayload};

/// Compile `topic` into a navigable sequence.
///
/// `next_topic` is the topic following this one in the catalog, if any.
/// Deterministic: the same inputs always produce an identical sequence.
pub fn compile(topic: &Topic, next_topic: Option<&TopicSummary>) -> CompiledSequence {
    let end = topic.nodes.len();
    let mut steps = topic
        .nodes
        .iter()
        .fold(FoldState::default(), FoldState::accept)
        .finish(end);

    if let Some(next) = next_topic {
        steps.push(CompiledStep {
            kind: StepKind::NextTopicCard,
            position: Position::Injected { before: end },
            active_header: None,
            payload: StepPayload::NextTopic {
                topic: next.clone(),
            },
        });
    }

    debug!(
        topic_id = %topic.id,
        nodes = end,
        steps = steps.len(),
        "compiled topic"
    );
    CompiledSequence {
        topic_id: topic.id.clone(),
        steps,
    }
}

/// Catalog-aware compilation.
pub trait CatalogCompile {
    /// Compile topic `id`, resolving the "up next" card from catalog order.
    fn compile(&self, id: &str) -> Result<CompiledSequence>;
}

impl CatalogCompile for TopicCatalog {
    fn compile(&self, id: &str) -> Result<CompiledSequence> {
        let topic = self.require(id)?;
        let next = self.next_after(id);
        Ok(compile(topic, next.as_ref()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fold accumulator
// ─────────────────────────────────────────────────────────────────────────────

/// The header currently governing emitted steps.
struct PendingHeader {
    header: HeaderRef,
    /// Steps emitted under this header, excluding the header itself.
    children: usize,
}

/// Accumulator threaded through the fold. Each transition consumes the old
/// state and returns the next one.
#[derive(Default)]
struct FoldState {
    steps: Vec<CompiledStep>,
    pending: Option<PendingHeader>,
    example_run: Vec<ContentNode>,
    quiz_run: Vec<ContentNode>,
}

impl FoldState {
    fn accept(self, node: &ContentNode) -> Self {
        match node.kind {
            NodeKind::SectionHeader => self.flush_runs().open_module(node),
            NodeKind::Example => {
                let mut state = self.flush_quizzes();
                state.example_run.push(node.clone());
                state
            }
            NodeKind::Quiz => {
                let mut state = self.flush_examples();
                state.quiz_run.push(node.clone());
                state
            }
            NodeKind::Explanation => self.flush_runs().emit_node(node, StepKind::Explanation),
            NodeKind::Checkpoint => self.flush_runs().close_with(node, StepKind::Checkpoint),
            NodeKind::Other => self.flush_runs().close_with(node, StepKind::Other),
        }
    }

    /// Emit `node` under the current header, then drop the header.
    fn close_with(self, node: &ContentNode, kind: StepKind) -> Self {
        let mut state = self.emit_node(node, kind);
        state.pending = None;
        state
    }

    fn finish(self, end: usize) -> Vec<CompiledStep> {
        let mut state = self.flush_runs();
        if let Some(completion) = state.close_module(end, None) {
            state.steps.push(completion);
        }
        state.steps
    }

    fn open_module(mut self, node: &ContentNode) -> Self {
        let header = HeaderRef::of(node);
        if let Some(completion) = self.close_module(node.position, Some(header.clone())) {
            self.steps.push(completion);
        }
        self.steps.push(CompiledStep {
            kind: StepKind::SectionHeader,
            position: Position::Node(node.position),
            active_header: Some(header.clone()),
            payload: StepPayload::Node { node: node.clone() },
        });
        self.pending = Some(PendingHeader {
            header,
            children: 0,
        });
        self
    }

    /// Completion card for the pending module, if it has any children.
    fn close_module(&self, before: usize, next: Option<HeaderRef>) -> Option<CompiledStep> {
        let pending = self.pending.as_ref().filter(|p| p.children > 0)?;
        Some(CompiledStep {
            kind: StepKind::ModuleCompletion,
            position: Position::Injected { before },
            active_header: Some(pending.header.clone()),
            payload: StepPayload::ModuleCompletion {
                completed: pending.header.clone(),
                next,
            },
        })
    }

    fn emit_node(mut self, node: &ContentNode, kind: StepKind) -> Self {
        let payload = StepPayload::Node { node: node.clone() };
        self.push_tagged(kind, Position::Node(node.position), payload);
        self
    }

    fn flush_runs(self) -> Self {
        self.flush_examples().flush_quizzes()
    }

    fn flush_examples(mut self) -> Self {
        let members = std::mem::take(&mut self.example_run);
        self.push_group(StepKind::ExampleGroup, members);
        self
    }

    fn flush_quizzes(mut self) -> Self {
        let members = std::mem::take(&mut self.quiz_run);
        self.push_group(StepKind::QuizGroup, members);
        self
    }

    fn push_group(&mut self, kind: StepKind, members: Vec<ContentNode>) {
        let Some(first) = members.first() else {
            return;
        };
        let position = Position::Node(first.position);
        self.push_tagged(kind, position, StepPayload::Group { members });
    }

    fn push_tagged(&mut self, kind: StepKind, position: Position, payload: StepPayload) {
        let active_header = self.pending.as_mut().map(|p| {
            p.children += 1;
            p.header.clone()
        });
        self.steps.push(CompiledStep {
            kind,
            position,
            active_header,
            payload,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lesson_core::errors::CatalogError;

    fn topic(nodes: Vec<ContentNode>) -> Topic {
        Topic::new("p5", "Primary 5", nodes)
    }

    fn header_id(step: &CompiledStep) -> Option<&str> {
        step.active_header
            .as_ref()
            .and_then(|h| h.id.as_ref())
            .map(|id| id.as_str())
    }

    fn kinds(seq: &CompiledSequence) -> Vec<StepKind> {
        seq.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn scenario_a_groups_and_module_completion() {
        let t = topic(vec![
            ContentNode::header("intro", "Intro"),
            ContentNode::explanation("a"),
            ContentNode::example("1"),
            ContentNode::example("2"),
            ContentNode::quiz("q1", "1"),
            ContentNode::quiz("q2", "2"),
            ContentNode::header("part2", "Part 2"),
        ]);
        let seq = compile(&t, None);

        assert_eq!(
            kinds(&seq),
            vec![
                StepKind::SectionHeader,
                StepKind::Explanation,
                StepKind::ExampleGroup,
                StepKind::QuizGroup,
                StepKind::ModuleCompletion,
                StepKind::SectionHeader,
            ]
        );
        for step in &seq.steps[..5] {
            assert_eq!(header_id(step), Some("intro"));
        }
        assert_eq!(header_id(&seq.steps[5]), Some("part2"));

        let ids: Vec<&str> = seq.steps[2]
            .members()
            .iter()
            .map(|m| m.id.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(seq.steps[3].members().len(), 2);

        assert_eq!(seq.steps[4].position, Position::Injected { before: 6 });
        assert_matches!(
            &seq.steps[4].payload,
            StepPayload::ModuleCompletion { completed, next: Some(next) }
                if completed.has_id("intro") && next.has_id("part2")
        );
    }

    #[test]
    fn scenario_d_empty_topic_without_next() {
        let seq = compile(&topic(vec![]), None);
        assert!(seq.is_empty());
    }

    #[test]
    fn empty_topic_with_next_has_only_next_card() {
        let next = TopicSummary {
            id: "p6".into(),
            title: "Primary 6".into(),
        };
        let seq = compile(&topic(vec![]), Some(&next));
        assert_eq!(kinds(&seq), vec![StepKind::NextTopicCard]);
        assert!(seq.steps[0].active_header.is_none());
        assert_eq!(seq.steps[0].position, Position::Injected { before: 0 });
    }

    #[test]
    fn trailing_module_gets_completion_then_next_card() {
        let next = TopicSummary {
            id: "p6".into(),
            title: "Primary 6".into(),
        };
        let t = topic(vec![
            ContentNode::header("h", "Only"),
            ContentNode::quiz("q", "1"),
        ]);
        let seq = compile(&t, Some(&next));
        assert_eq!(
            kinds(&seq),
            vec![
                StepKind::SectionHeader,
                StepKind::QuizGroup,
                StepKind::ModuleCompletion,
                StepKind::NextTopicCard,
            ]
        );
        assert_matches!(
            &seq.steps[2].payload,
            StepPayload::ModuleCompletion { next: None, .. }
        );
        assert_eq!(seq.steps[2].position, Position::Injected { before: 2 });
    }

    #[test]
    fn topic_without_headers_has_no_active_header() {
        let t = topic(vec![
            ContentNode::explanation("a"),
            ContentNode::quiz("q1", "1"),
            ContentNode::example("e1"),
            ContentNode::checkpoint("cp"),
        ]);
        let seq = compile(&t, None);
        assert_eq!(seq.len(), 4);
        assert!(seq.iter().all(|s| s.active_header.is_none()));
    }

    #[test]
    fn checkpoint_clears_header() {
        let t = topic(vec![
            ContentNode::header("h", "H"),
            ContentNode::quiz("q1", "1"),
            ContentNode::checkpoint("cp"),
            ContentNode::quiz("q2", "2"),
            ContentNode::header("h2", "H2"),
        ]);
        let seq = compile(&t, None);
        assert_eq!(
            kinds(&seq),
            vec![
                StepKind::SectionHeader,
                StepKind::QuizGroup,
                StepKind::Checkpoint,
                StepKind::QuizGroup,
                StepKind::SectionHeader,
            ]
        );
        // checkpoint itself is still tagged
        assert_eq!(header_id(&seq.steps[2]), Some("h"));
        assert_eq!(header_id(&seq.steps[3]), None);
    }

    #[test]
    fn unknown_kind_stands_alone_and_clears_header() {
        let t = topic(vec![
            ContentNode::header("h", "H"),
            ContentNode::example("e1"),
            ContentNode::new(NodeKind::Other).with_id("diagram"),
            ContentNode::example("e2"),
            ContentNode::header("h2", "H2"),
        ]);
        let seq = compile(&t, None);
        assert_eq!(
            kinds(&seq),
            vec![
                StepKind::SectionHeader,
                StepKind::ExampleGroup,
                StepKind::Other,
                StepKind::ExampleGroup,
                StepKind::SectionHeader,
            ]
        );
        assert_eq!(seq.steps[2].id().map(|id| id.as_str()), Some("diagram"));
        assert_eq!(header_id(&seq.steps[2]), Some("h"));
        assert_eq!(header_id(&seq.steps[3]), None);
    }

    #[test]
    fn interleaved_runs_alternate_groups_under_one_header() {
        let t = topic(vec![
            ContentNode::header("h", "H"),
            ContentNode::example("e1"),
            ContentNode::quiz("q1", "1"),
            ContentNode::quiz("q2", "2"),
            ContentNode::example("e2"),
        ]);
        let seq = compile(&t, None);
        assert_eq!(
            kinds(&seq),
            vec![
                StepKind::SectionHeader,
                StepKind::ExampleGroup,
                StepKind::QuizGroup,
                StepKind::ExampleGroup,
                StepKind::ModuleCompletion,
            ]
        );
        assert!(seq.steps[1..4].iter().all(|s| header_id(s) == Some("h")));
        assert_eq!(seq.steps[2].position, Position::Node(2));
    }

    #[test]
    fn back_to_back_headers_inject_nothing() {
        let t = topic(vec![
            ContentNode::header("a", "A"),
            ContentNode::header("b", "B"),
            ContentNode::explanation("x"),
        ]);
        let seq = compile(&t, None);
        assert_eq!(
            kinds(&seq),
            vec![
                StepKind::SectionHeader,
                StepKind::SectionHeader,
                StepKind::Explanation,
                StepKind::ModuleCompletion,
            ]
        );
    }

    #[test]
    fn compile_is_deterministic() {
        let t = topic(vec![
            ContentNode::header("h", "H"),
            ContentNode::example("e"),
            ContentNode::quiz("q", "1"),
            ContentNode::checkpoint("cp"),
        ]);
        assert_eq!(compile(&t, None), compile(&t, None));
    }

    #[test]
    fn catalog_compile_resolves_next_topic() {
        let catalog = TopicCatalog::new(vec![
            topic(vec![ContentNode::explanation("a")]),
            Topic::new("p6", "Primary 6", vec![]),
        ]);
        let seq = catalog.compile("p5").unwrap();
        assert_eq!(seq.len(), 2);
        assert_matches!(
            &seq.steps[1].payload,
            StepPayload::NextTopic { topic } if topic.id.as_str() == "p6"
        );
        assert!(catalog.compile("p6").unwrap().is_empty());
        assert_matches!(catalog.compile("p9"), Err(CatalogError::TopicNotFound(_)));
    }

    #[test]
    fn sequence_renders_one_line_per_step() {
        let t = topic(vec![
            ContentNode::header("intro", "Intro"),
            ContentNode::explanation("a"),
            ContentNode::example("1"),
            ContentNode::example("2"),
            ContentNode::quiz("q1", "1"),
            ContentNode::quiz("q2", "2"),
            ContentNode::header("part2", "Part 2"),
            ContentNode::checkpoint("done"),
        ]);
        let next = TopicSummary {
            id: "p6".into(),
            title: "Primary 6".into(),
        };
        insta::assert_snapshot!(compile(&t, Some(&next)).to_string(), @r"
        #0     0  SectionHeader(intro) @intro
        #1     1  Explanation(a) @intro
        #2     2  ExampleGroup[1,2] @intro
        #3     4  QuizGroup[q1,q2] @intro
        #4     6- ModuleCompletion(intro->part2) @intro
        #5     6  SectionHeader(part2) @part2
        #6     7  Checkpoint(done) @part2
        #7     8- NextTopicCard(p6)
        ");
    }
}
