//! Document graph over vault notes.
//!
//! Nodes are built from note content (title and raw links); a resolution
//! pass then matches each raw target to a node path, leaving misses as
//! dangling links.

mod builder;
mod resolve;
mod types;

pub use builder::GraphBuilder;
pub use types::{DocumentNode, GraphStats, LinkEdge, LinkResolution};
