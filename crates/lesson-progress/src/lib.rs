//! # lesson-progress
//!
//! Learner progress for the lesson engine.
//!
//! - [`store`]: [`MemoryProgressStore`], a shared thread-safe
//!   [`ProgressStore`](lesson_core::progress::ProgressStore) that grades quiz
//!   attempts and tracks checkpoint completion
//! - [`snapshot`]: JSON import/export in the legacy string-key format
//! - [`summary`]: dashboard totals and rank
//!
//! There is no durable storage engine; hosts persist snapshots themselves.
//!
//! ## Crate Position
//!
//! Depends on lesson-core. Used by lesson-cli and by engine tests.

#![deny(unsafe_code)]

pub mod errors;
pub mod snapshot;
pub mod store;
pub mod summary;

pub use errors::{ProgressError, Result};
pub use snapshot::ProgressSnapshot;
pub use store::{DEFAULT_PASS_RATIO, MemoryProgressStore};
pub use summary::{LearnerSummary, Rank, RecentAttempt};
