//! Ontology graph store
//!
//! Nodes are terms, edges are parent -> child is-a relations. The store is
//! built once from a parsed document and never mutated afterwards, so it can
//! be shared behind an `Arc` by any number of readers.

pub mod store;
pub mod term;

pub use store::{Ontology, OntologyBuilder, OntologyStatistics};
pub use term::{Term, TermId};

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// TOP -> R -> A -> {B, C} -> D, plus an isolated obsolete X.
    /// R is the designated root; B also answers to "B-old".
    pub(crate) fn sample() -> Ontology {
        let mut builder = OntologyBuilder::new().with_root("R").with_version("test/1");
        for (id, label) in [("R", "Root"), ("A", "Term A"), ("C", "Term C"), ("D", "Term D")] {
            builder.add_term(Term::new(id, label));
        }
        let mut b = Term::new("B", "Term B");
        b.alt_ids.push("B-old".to_string());
        builder.add_term(b);
        let mut x = Term::new("X", "Retired X");
        x.obsolete = true;
        builder.add_term(x);

        let edges = [
            ("TOP", "R"),
            ("R", "A"),
            ("A", "B"),
            ("A", "C"),
            ("B", "D"),
            ("C", "D"),
        ];
        for (parent, child) in edges {
            builder.add_is_a(parent, child);
        }
        builder.build()
    }
}
