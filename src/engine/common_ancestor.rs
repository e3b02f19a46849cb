//! Deepest shared ancestor of two terms

use super::closure::ClosureEngine;
use crate::ontology::{Ontology, TermId};
use phenograph_algorithms::{Direction, NodeIndex};
use std::cmp::Reverse;
use std::collections::BTreeSet;

impl<'a> ClosureEngine<'a> {
    /// Most specific non-trivial ancestor shared by `a` and `b` (each term
    /// counts as its own ancestor).
    ///
    /// Candidates exclude the root and everything above it. Among candidates
    /// with no other candidate below them, the deepest wins; ties go to the
    /// smallest id. `None` when either term is unknown or nothing qualifies.
    pub fn closest_common_ancestor(&mut self, a: &str, b: &str) -> Option<TermId> {
        let ontology = self.ontology();
        let ia = ontology.index_of(a)?;
        let ib = ontology.index_of(b)?;

        let up_b: BTreeSet<NodeIndex> = self.reach(ib, Direction::Up).iter().copied().collect();
        let candidates: Vec<NodeIndex> = self
            .reach(ia, Direction::Up)
            .iter()
            .copied()
            .filter(|idx| up_b.contains(idx))
            .filter(|&idx| {
                !ontology.is_trivial_root(idx) && ontology.layering().depth(idx).is_some()
            })
            .collect();

        // A candidate that is a strict ancestor of another candidate is less specific
        let mut dominated = BTreeSet::new();
        for &idx in &candidates {
            for &above in self.reach(idx, Direction::Up).iter() {
                if above != idx {
                    dominated.insert(above);
                }
            }
        }
        let mut specific: Vec<NodeIndex> = candidates
            .iter()
            .copied()
            .filter(|idx| !dominated.contains(idx))
            .collect();
        if specific.is_empty() {
            // Only possible when candidates sit on a cycle
            specific = candidates;
        }

        specific
            .into_iter()
            .max_by_key(|&idx| (ontology.layering().depth(idx), Reverse(idx)))
            .map(|idx| ontology.id_at(idx).clone())
    }
}

/// One-shot form of [`ClosureEngine::closest_common_ancestor`]
pub fn closest_common_ancestor(ontology: &Ontology, a: &str, b: &str) -> Option<TermId> {
    ClosureEngine::new(ontology).closest_common_ancestor(a, b)
}
