//! Phenograph: phenotype ontology graph engine
//!
//! Builds an immutable is-a DAG from an OBO source and answers the queries a
//! phenotype cohort browser needs.
//!
//! # Components
//!
//! - [`loader`]: cache-then-fetch source loading and the single-flight [`OntologyService`]
//! - [`ontology`]: the graph store, with precomputed depth and parent-of-record per term
//! - [`engine`]: ancestor / descendant closures, count consolidation, common ancestors
//! - [`viz`]: minimal display trees and hierarchical chart tuples
//!
//! Unknown or disconnected terms never fail a query. They are reported as
//! [`Diagnostic`]s next to a best-effort result. The only fatal condition is
//! [`LoadError::SourceUnavailable`].
//!
//! ## Example Usage
//!
//! ```rust
//! use phenograph::{consolidate, ClosureEngine, OntologyBuilder};
//!
//! let mut builder = OntologyBuilder::new().with_root("R");
//! builder.add_is_a("R", "A");
//! builder.add_is_a("A", "B");
//! builder.add_is_a("A", "C");
//! let ontology = builder.build();
//!
//! let mut engine = ClosureEngine::new(&ontology);
//! let up = engine.ancestors_of_any(["B", "C"]);
//! assert_eq!(up.len(), 4);
//!
//! let merged = consolidate(&ontology, [("B", 1), ("C", 1), ("A", 0)], 3);
//! assert_eq!(merged.counts.get("R"), Some(&2));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod annotation;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod loader;
pub mod obo;
pub mod ontology;
pub mod viz;

// Re-export main types for convenience
pub use annotation::{count_annotations, Annotation};
pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use diagnostics::{Diagnostic, Diagnostics};

pub use engine::{
    closest_common_ancestor, consolidate, Closure, ClosureEngine, Consolidation, FilterSets,
    PhenotypeFilter,
};

pub use loader::{
    LoadError, LoadResult, OntologyService, RefreshOutcome, SourceCache, SourceFetcher,
    SourceLoader,
};

pub use obo::{parse_document, OboDocument, ParseError, ParseResult, TermFrame};

pub use ontology::{Ontology, OntologyBuilder, OntologyStatistics, Term, TermId};

pub use viz::{
    build_chart, build_display_tree, chart_from_counts, ChartData, ChartEntry, ChartOptions,
    DisplayTree, TreeNode,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
