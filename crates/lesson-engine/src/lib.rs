//! # lesson-engine
//!
//! Topic compiler, section gating, deep-link resolution, and navigation.
//!
//! A topic's authored nodes are compiled once into a linear sequence of
//! steps; everything else is derived from that sequence plus progress.
//!
//! ## Module Overview
//!
//! - [`compiler`]: nodes to [`CompiledSequence`] (grouping, header tagging, injected cards)
//! - [`locks`]: quiz batches and progress to a [`LockMap`]
//! - [`resolver`]: deep-link target to step index and group member
//! - [`cursor`]: per-session navigation state with bounds and lock checks
//! - [`review`]: review range extraction and the timed review session
//! - [`outline`]: table of contents and module dashboard
//! - [`search`]: catalog title/description search
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lesson_core::catalog::TopicCatalog;
//! use lesson_engine::compiler::CatalogCompile;
//! use lesson_engine::cursor::NavigationCursor;
//! use lesson_engine::locks::compute_locks;
//! use lesson_engine::types::GatingPolicy;
//! use lesson_progress::MemoryProgressStore;
//!
//! let catalog = TopicCatalog::load("topics.json".as_ref()).unwrap();
//! let store = MemoryProgressStore::new();
//! let topic = catalog.require("singapore-p5").unwrap();
//!
//! let sequence = catalog.compile("singapore-p5").unwrap();
//! let locks = compute_locks(topic, &store, &GatingPolicy::default());
//! let mut cursor = NavigationCursor::new(sequence, locks, false);
//! let _ = cursor.jump_to_deep_link("fractions");
//! ```
//!
//! ## Crate Position
//!
//! Depends on lesson-core and lesson-settings.
//! Depended on by: lesson-cli.

#![deny(unsafe_code)]

pub mod compiler;
pub mod constants;
pub mod cursor;
pub mod locks;
pub mod outline;
pub mod resolver;
pub mod review;
pub mod search;
pub mod types;

pub use compiler::{CatalogCompile, compile};
pub use cursor::NavigationCursor;
pub use locks::compute_locks;
pub use resolver::{Resolution, locate, resolve};
pub use review::{ReviewQuestion, ReviewSession, extract_review, is_review_request};
pub use types::{
    CompiledSequence, CompiledStep, GatingPolicy, LockEntry, LockMap, NavigationState, Position,
    StepKind,
};
