//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of a DAG topology for algorithm execution.

/// Dense node index (0..N) into a [`GraphView`]
pub type NodeIndex = usize;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Edges are directed parent -> child. Every adjacency row is sorted ascending
/// and free of duplicates, so callers that assign indices in a meaningful order
/// (e.g. lexicographic identifier order) get that order back from
/// [`successors`](Self::successors) and [`predecessors`](Self::predecessors).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<NodeIndex>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<NodeIndex>,
}

impl GraphView {
    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (children) of a node
    pub fn successors(&self, idx: NodeIndex) -> &[NodeIndex] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (parents) of a node
    pub fn predecessors(&self, idx: NodeIndex) -> &[NodeIndex] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Total number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Build a view from `(parent, child)` pairs.
    ///
    /// Pairs referencing an index `>= node_count` are skipped; self loops and
    /// duplicate pairs are dropped.
    pub fn from_edges(node_count: usize, edges: &[(NodeIndex, NodeIndex)]) -> Self {
        let mut outgoing: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
        for &(parent, child) in edges {
            if parent >= node_count || child >= node_count || parent == child {
                continue;
            }
            outgoing[parent].push(child);
        }
        Self::from_adjacency_list(node_count, outgoing)
    }

    /// Create a view from outgoing adjacency lists; incoming lists are derived.
    pub fn from_adjacency_list(node_count: usize, mut outgoing: Vec<Vec<NodeIndex>>) -> Self {
        outgoing.resize(node_count, Vec::new());

        let mut incoming: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
        for row in outgoing.iter_mut() {
            row.sort_unstable();
            row.dedup();
        }
        // Rows are visited in ascending source order, so incoming rows come out sorted
        for (source, row) in outgoing.iter().enumerate() {
            for &target in row {
                incoming[target].push(source);
            }
        }

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();

        out_offsets.push(0);
        for neighbors in outgoing {
            out_targets.extend(neighbors);
            out_offsets.push(out_targets.len());
        }

        in_offsets.push(0);
        for sources in incoming {
            in_sources.extend(sources);
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
        }
    }
}
