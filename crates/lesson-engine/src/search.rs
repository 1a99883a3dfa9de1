//! Catalog search.
//!
//! Case-insensitive substring search over topic titles, node titles, and node
//! descriptions. Each hit carries a `(topic_id, node_id)` deep-link target.

use lesson_core::catalog::TopicCatalog;
use lesson_core::content::NodeKind;
use lesson_core::ids::{NodeId, TopicId};
use lesson_core::text::contains_lowercase;
use lesson_settings::SearchSettings;
use serde::Serialize;
use tracing::debug;

/// What a result matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchKind {
    /// A topic title.
    Topic,
    /// A section header title.
    Section,
    /// The title of any other node.
    Item,
    /// A node description.
    Content,
}

/// One search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Match kind.
    pub kind: SearchKind,
    /// Display title.
    pub title: String,
    /// Secondary line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Topic to open.
    pub topic_id: TopicId,
    /// Deep-link target inside the topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
}

/// Search `catalog` for `query`.
///
/// Queries shorter than `min_query_len` characters return nothing. A node
/// whose title matches is not also reported for its description.
pub fn search(catalog: &TopicCatalog, query: &str, settings: &SearchSettings) -> Vec<SearchResult> {
    if query.chars().count() < settings.min_query_len {
        return Vec::new();
    }
    let lowered = query.to_lowercase();
    let needle = lowered.as_str();

    let hits = catalog.topics().iter().flat_map(move |topic| {
        let topic_hit = contains_lowercase(&topic.title, needle).then(|| SearchResult {
            kind: SearchKind::Topic,
            title: topic.title.clone(),
            subtitle: None,
            topic_id: topic.id.clone(),
            node_id: None,
        });

        let node_hits = topic.nodes.iter().filter_map(move |node| {
            let result = |kind, title, subtitle| SearchResult {
                kind,
                title,
                subtitle: Some(subtitle),
                topic_id: topic.id.clone(),
                node_id: node.id.clone(),
            };
            if let Some(title) = node.title.as_deref().filter(|t| contains_lowercase(t, needle)) {
                let kind = match node.kind {
                    NodeKind::SectionHeader => SearchKind::Section,
                    _ => SearchKind::Item,
                };
                return Some(result(kind, title.to_owned(), topic.title.clone()));
            }
            node.description
                .as_deref()
                .filter(|d| contains_lowercase(d, needle))
                .map(|_| {
                    let title = node
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("Item in {}", topic.title));
                    result(SearchKind::Content, title, "Matches description".to_owned())
                })
        });

        topic_hit.into_iter().chain(node_hits)
    });

    let results: Vec<SearchResult> = hits.take(settings.max_results).collect();
    debug!(query, results = results.len(), "catalog search");
    results
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::content::{ContentNode, Topic};

    fn catalog() -> TopicCatalog {
        TopicCatalog::new(vec![
            Topic::new(
                "p5",
                "Primary 5 Fractions",
                vec![
                    ContentNode::header("adding", "Adding Fractions"),
                    ContentNode::quiz("q1", "1").with_title("Fraction drill"),
                    ContentNode::explanation("why")
                        .with_description("Why equal parts matter for fractions"),
                    ContentNode::example("ex").with_description("Halves and quarters"),
                ],
            ),
            Topic::new(
                "p6",
                "Primary 6 Ratios",
                vec![ContentNode::header("ratio", "Ratio basics")],
            ),
        ])
    }

    #[test]
    fn matches_titles_then_descriptions() {
        let results = search(&catalog(), "FRACTION", &SearchSettings::default());
        let kinds: Vec<SearchKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SearchKind::Topic,
                SearchKind::Section,
                SearchKind::Item,
                SearchKind::Content,
            ]
        );
        assert_eq!(results[1].subtitle.as_deref(), Some("Primary 5 Fractions"));
        assert_eq!(results[1].node_id.as_ref().map(NodeId::as_str), Some("adding"));
        assert_eq!(results[3].title, "Item in Primary 5 Fractions");
        assert_eq!(results[3].subtitle.as_deref(), Some("Matches description"));
    }

    #[test]
    fn short_query_returns_nothing() {
        assert!(search(&catalog(), "r", &SearchSettings::default()).is_empty());
        assert!(search(&catalog(), "", &SearchSettings::default()).is_empty());
    }

    #[test]
    fn results_are_capped() {
        let settings = SearchSettings {
            max_results: 2,
            ..SearchSettings::default()
        };
        assert_eq!(search(&catalog(), "fraction", &settings).len(), 2);
    }

    #[test]
    fn topic_hit_has_no_node_target() {
        let results = search(&catalog(), "ratios", &SearchSettings::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, SearchKind::Topic);
        assert_eq!(results[0].topic_id.as_str(), "p6");
        assert!(results[0].node_id.is_none());
    }
}
