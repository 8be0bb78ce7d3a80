#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Incremental knowledge graph over a vault of markdown notes.
//!
//! A [`sync::SyncEngine`] diffs the vault against its cached state, rebuilds the
//! link graph for changed notes and forwards their content to an external
//! [`index::DocumentIndex`]. Queries go through [`knowledge::KnowledgeGraphService`].

pub mod config;
pub mod graph;
pub mod index;
pub mod knowledge;
pub mod store;
pub mod sync;
pub mod tracker;
pub mod vault;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
