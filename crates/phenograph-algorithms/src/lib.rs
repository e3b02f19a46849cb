//! Dense, index-based DAG algorithms backing the Phenograph ontology engine.
//!
//! Nothing here knows about term identifiers: callers map their ids onto
//! `0..N` and get indices back.

pub mod common;
pub mod traversal;
pub mod pathfinding;
pub mod topology;

pub use common::{GraphView, NodeIndex};
pub use traversal::{reachable, Direction};
pub use pathfinding::{path_to_root, DepthLayering};
pub use topology::back_edges;
