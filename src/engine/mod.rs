//! Query engines over a built [`Ontology`](crate::ontology::Ontology)
//!
//! All engines borrow the graph read-only and allocate fresh results, so any
//! number of them can run against one shared graph at the same time.

pub mod closure;
pub mod common_ancestor;
pub mod consolidation;

pub use closure::{
    Closure, ClosureEngine, FilterSets, PhenotypeFilter, DEFAULT_CLOSURE_CACHE_CAPACITY,
};
pub use common_ancestor::closest_common_ancestor;
pub use consolidation::{consolidate, Consolidation};
