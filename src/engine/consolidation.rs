//! Count consolidation
//!
//! Sparse per-term counts are pushed up the hierarchy until every retained
//! term below the root holds at least `threshold` records. Each pass takes
//! the deepest layer of rare terms and merges each of them into its
//! parent-of-record. Mass only moves, it is never created or dropped.

use crate::diagnostics::Diagnostics;
use crate::ontology::{Ontology, TermId};
use phenograph_algorithms::NodeIndex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Consolidated counts plus what happened on the way
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Consolidation {
    pub counts: BTreeMap<TermId, u64>,
    pub diagnostics: Diagnostics,
    /// Merge passes performed
    pub iterations: usize,
}

impl Consolidation {
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Keep only keys present in the graph, summing alternate ids into their
/// primary term
pub(crate) fn validate_counts<I, S>(
    ontology: &Ontology,
    counts: I,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<NodeIndex, u64>
where
    I: IntoIterator<Item = (S, u64)>,
    S: AsRef<str>,
{
    let mut working = BTreeMap::new();
    for (id, count) in counts {
        let id = id.as_ref();
        match ontology.index_of(id) {
            Some(idx) => *working.entry(idx).or_insert(0) += count,
            None => diagnostics.unknown_term(id),
        }
    }
    working
}

/// Merge rare counts upwards until every non-root, root-connected term
/// reaches `threshold`. `threshold <= 0` returns the validated input.
pub fn consolidate<I, S>(ontology: &Ontology, counts: I, threshold: i64) -> Consolidation
where
    I: IntoIterator<Item = (S, u64)>,
    S: AsRef<str>,
{
    let mut diagnostics = Diagnostics::new();
    let mut working = validate_counts(ontology, counts, &mut diagnostics);
    let mut iterations = 0;

    if threshold > 0 {
        let threshold = threshold as u64;
        let layering = ontology.layering();
        let root = layering.root;

        for &idx in working.keys() {
            if layering.depth(idx).is_none() {
                diagnostics.disconnected(ontology.id_at(idx).clone());
            }
        }

        let max_passes = working.len() + layering.max_depth() as usize + 1;
        loop {
            // Rare, connected, non-root terms with their depth
            let rare: Vec<(NodeIndex, u32)> = working
                .iter()
                .filter(|&(&idx, &count)| count < threshold && Some(idx) != root)
                .filter_map(|(&idx, _)| layering.depth(idx).map(|d| (idx, d)))
                .collect();

            let Some(level) = rare.iter().map(|&(_, d)| d).max() else {
                break;
            };
            if iterations >= max_passes {
                warn!("Consolidation stopped after {} passes without converging", iterations);
                break;
            }
            iterations += 1;

            for (idx, _) in rare.into_iter().filter(|&(_, d)| d == level) {
                let Some(parent) = layering.parent(idx) else {
                    continue;
                };
                if let Some(count) = working.remove(&idx) {
                    *working.entry(parent).or_insert(0) += count;
                }
            }
        }
    }

    let counts: BTreeMap<TermId, u64> = working
        .into_iter()
        .map(|(idx, count)| (ontology.id_at(idx).clone(), count))
        .collect();

    debug!(
        "Consolidated to {} terms (threshold {}) in {} passes",
        counts.len(),
        threshold,
        iterations
    );

    Consolidation {
        counts,
        diagnostics,
        iterations,
    }
}
