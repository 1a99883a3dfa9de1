//! # lesson-core
//!
//! Content model, typed progress vocabulary, and shared utilities for the
//! lesson navigation engine.
//!
//! - **Branded IDs**: [`ids::TopicId`], [`ids::NodeId`], [`ids::SessionId`] as newtypes
//! - **Content**: [`content::ContentNode`] and [`content::Topic`] in the legacy `topics.json` shape
//! - **Catalog**: [`catalog::TopicCatalog`], the ordered topic list
//! - **Progress**: [`progress::ProgressKey`], [`progress::ProgressRecord`] and the
//!   [`progress::ProgressLookup`] / [`progress::ProgressStore`] seams
//! - **Errors**: [`errors::CatalogError`] via `thiserror`
//! - **Logging**: [`logging::init_subscriber`] and [`logging::capture_logs`]
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other lesson crates.

#![deny(unsafe_code)]

pub mod catalog;
pub mod content;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod progress;
pub mod text;
