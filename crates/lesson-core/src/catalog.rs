//! Ordered topic catalog.
//!
//! The catalog is the content source: an ordered list of [`Topic`]s loaded
//! from a `topics.json` document. Order matters: the topic after the current
//! one is offered as "up next" at the end of a compiled sequence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::content::{Topic, TopicSummary};
use crate::errors::{CatalogError, Result};

/// Ordered list of topics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Build a catalog from topics in display order.
    #[must_use]
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// Parse a catalog from a JSON array of topic documents.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        debug!(topics = catalog.len(), "parsed topic catalog");
        Ok(catalog)
    }

    /// Load a catalog from a `topics.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&content)?;
        info!(?path, topics = catalog.len(), "loaded topic catalog");
        Ok(catalog)
    }

    /// All topics in display order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Number of topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the catalog has no topics.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Look up a topic by ID.
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id.as_str() == id)
    }

    /// Look up a topic by ID, failing with [`CatalogError::TopicNotFound`].
    pub fn require(&self, id: &str) -> Result<&Topic> {
        self.get(id)
            .ok_or_else(|| CatalogError::TopicNotFound(id.to_string()))
    }

    /// The topic following `id` in catalog order, if any.
    ///
    /// Returns `None` for the last topic and for unknown IDs.
    pub fn next_after(&self, id: &str) -> Option<TopicSummary> {
        let index = self.topics.iter().position(|t| t.id.as_str() == id)?;
        self.topics.get(index + 1).map(Topic::summary)
    }

    /// A new catalog containing only the listed topics, in the listed order.
    ///
    /// Unknown IDs are skipped; topics not listed are dropped.
    #[must_use]
    pub fn reordered(&self, order: &[&str]) -> Self {
        let topics = order
            .iter()
            .filter_map(|id| {
                let found = self.get(id);
                if found.is_none() {
                    debug!(id, "reorder skipped unknown topic");
                }
                found.cloned()
            })
            .collect();
        Self { topics }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
