//! Persistent sync state.
//!
//! The tracker cache and graph nodes are saved to a SQLite database between
//! runs so that the next pass only processes what changed:
//!
//! ```no_run
//! use vaultgraph_core::store::StateStore;
//! use std::path::Path;
//!
//! let store = StateStore::open(Path::new(".vaultgraph/state.db")).unwrap();
//! let snapshot = store.load().unwrap();
//! println!("{} tracked files", snapshot.files.len());
//! ```

pub mod db;
pub mod schema;

pub use db::{Snapshot, StateStore, StoreError};
pub use schema::{SCHEMA_VERSION, SchemaError};

/// File name of the state database inside the state directory.
pub const STATE_DB: &str = "state.db";
