//! Table of contents and module dashboard.
//!
//! Both views are read-only projections of a [`CompiledSequence`] plus
//! progress. Every entry carries the `(step_index, sub_index)` pair the host
//! passes to [`NavigationCursor::jump_to`](crate::cursor::NavigationCursor::jump_to).

use lesson_core::content::{ContentNode, NodeKind};
use lesson_core::ids::NodeId;
use lesson_core::progress::{ProgressKey, ProgressLookup};
use lesson_core::text::truncate_with_suffix;
use lesson_settings::OutlineSettings;
use serde::Serialize;

use crate::types::{CompiledSequence, StepKind};

/// Kind of a table-of-contents entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TocKind {
    /// A section header.
    Section,
    /// A checkpoint.
    Checkpoint,
}

/// One row of the table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    /// Step to jump to.
    pub step_index: usize,
    /// Row kind.
    pub kind: TocKind,
    /// Node ID, when authored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// Display title.
    pub title: String,
    /// Truncated description (sections only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether a completion record exists for this ID.
    pub completed: bool,
}

/// Headers and checkpoints of `sequence`, in step order.
pub fn table_of_contents<P>(
    sequence: &CompiledSequence,
    progress: &P,
    settings: &OutlineSettings,
) -> Vec<TocEntry>
where
    P: ProgressLookup + ?Sized,
{
    sequence
        .iter()
        .enumerate()
        .filter_map(|(step_index, step)| {
            let kind = match step.kind {
                StepKind::SectionHeader => TocKind::Section,
                StepKind::Checkpoint => TocKind::Checkpoint,
                _ => return None,
            };
            let node = step.node()?;
            let description = match kind {
                TocKind::Section => node
                    .description
                    .as_deref()
                    .map(|d| truncate_with_suffix(d, settings.max_description_len, "...")),
                TocKind::Checkpoint => None,
            };
            Some(TocEntry {
                step_index,
                kind,
                id: node.id.clone(),
                title: node
                    .title
                    .clone()
                    .unwrap_or_else(|| settings.checkpoint_title.clone()),
                description,
                completed: is_complete(node, progress),
            })
        })
        .collect()
}

/// One card on a module dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleItem {
    /// Step holding the item.
    pub step_index: usize,
    /// Member index inside a group step; 0 otherwise.
    pub sub_index: usize,
    /// Authored kind.
    pub kind: NodeKind,
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Deep-link target for the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<NodeId>,
    /// Quiz passed, or checkpoint complete.
    pub completed: bool,
}

/// Items belonging to the module opened at `header_step`.
///
/// Each group member is its own item. Returns nothing when `header_step` is
/// not a section header.
pub fn module_items<P>(
    sequence: &CompiledSequence,
    header_step: usize,
    progress: &P,
) -> Vec<ModuleItem>
where
    P: ProgressLookup + ?Sized,
{
    let Some(header) = sequence
        .get(header_step)
        .filter(|s| s.kind == StepKind::SectionHeader)
        .and_then(|s| s.gating_position())
    else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for (step_index, step) in sequence.iter().enumerate().skip(header_step + 1) {
        if step.kind == StepKind::SectionHeader || step.gating_position() != Some(header) {
            break;
        }
        if step.kind == StepKind::ModuleCompletion {
            continue;
        }
        for (sub_index, node) in step.content_nodes().enumerate() {
            let completed = match node.kind {
                NodeKind::Quiz => {
                    let key = ProgressKey::quiz(sequence.topic_id.clone(), node.position);
                    progress.is_passed(&key)
                }
                NodeKind::Checkpoint => is_complete(node, progress),
                _ => false,
            };
            items.push(ModuleItem {
                step_index,
                sub_index,
                kind: node.kind,
                title: node.title.clone(),
                target_id: node.id.clone(),
                completed,
            });
        }
    }
    items
}

fn is_complete<P: ProgressLookup + ?Sized>(node: &ContentNode, progress: &P) -> bool {
    node.id
        .as_ref()
        .is_some_and(|id| progress.has_record(&ProgressKey::completion(id.clone())))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
