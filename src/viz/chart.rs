//! Hierarchical chart data (sunburst / network plots)
//!
//! Every emitted entry names its parent-of-record, and that parent is
//! emitted too, all the way to the root. Consolidation uses the same parent
//! rule, so a consolidated count map always forms a closed hierarchy.

use crate::diagnostics::Diagnostics;
use crate::engine::consolidation::{consolidate, validate_counts};
use crate::ontology::{Ontology, TermId};
use phenograph_algorithms::{path_to_root, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Chart building options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Terms below this count do not seed the chart
    pub min_count: u64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self { min_count: 1 }
    }
}

/// One chart tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub id: TermId,
    pub label: String,
    /// `None` for the root and for disconnected terms
    pub parent: Option<TermId>,
    /// The term's own count; 0 for structural ancestors without one
    pub value: u64,
}

/// Chart tuples ordered root-first, then by depth and id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub entries: Vec<ChartEntry>,
    pub diagnostics: Diagnostics,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.value).sum()
    }
}

/// Build chart tuples from an (already consolidated) count map
pub fn build_chart<I, S>(ontology: &Ontology, counts: I, options: ChartOptions) -> ChartData
where
    I: IntoIterator<Item = (S, u64)>,
    S: AsRef<str>,
{
    let mut diagnostics = Diagnostics::new();
    let validated = validate_counts(ontology, counts, &mut diagnostics);
    let layering = ontology.layering();

    // Only terms at or above min_count seed the chart; path nodes still
    // report whatever count they hold
    let mut emitted: BTreeSet<NodeIndex> = BTreeSet::new();
    for (&idx, &count) in &validated {
        if count < options.min_count {
            continue;
        }
        emitted.insert(idx);
        match path_to_root(layering, idx) {
            Some(path) => emitted.extend(path.into_iter().skip(1)),
            None => diagnostics.disconnected(ontology.id_at(idx).clone()),
        }
    }

    let mut entries: Vec<(Option<u32>, ChartEntry)> = emitted
        .into_iter()
        .map(|idx| {
            let value = validated.get(&idx).copied().unwrap_or(0);
            let term = ontology.term_at(idx);
            let entry = ChartEntry {
                id: term.id.clone(),
                label: term.label.clone(),
                parent: layering.parent(idx).map(|p| ontology.id_at(p).clone()),
                value,
            };
            (layering.depth(idx), entry)
        })
        .collect();
    entries.sort_by(|(da, a), (db, b)| {
        (da.is_none(), da, &a.id).cmp(&(db.is_none(), db, &b.id))
    });

    ChartData {
        entries: entries.into_iter().map(|(_, entry)| entry).collect(),
        diagnostics,
    }
}

/// Consolidate raw counts at `threshold`, then build chart tuples
pub fn chart_from_counts<I, S>(
    ontology: &Ontology,
    counts: I,
    threshold: i64,
    options: ChartOptions,
) -> ChartData
where
    I: IntoIterator<Item = (S, u64)>,
    S: AsRef<str>,
{
    let consolidated = consolidate(ontology, counts, threshold);
    let mut chart = build_chart(
        ontology,
        consolidated.counts.iter().map(|(id, &count)| (id.as_str(), count)),
        options,
    );
    let mut diagnostics = consolidated.diagnostics;
    diagnostics.extend(chart.diagnostics);
    chart.diagnostics = diagnostics;
    chart
}
