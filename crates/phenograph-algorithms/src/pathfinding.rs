//! Shortest paths to a fixed target
//!
//! In an is-a DAG with edges parent -> child, the shortest path from any node
//! up to the root is found by a single BFS *down* from the root. The BFS
//! layer of a node is its depth; a parent one layer closer to the root is a
//! valid next hop. Among several such parents the smallest index wins, which
//! makes the chosen path independent of edge insertion order.

use super::common::{GraphView, NodeIndex};
use std::collections::VecDeque;

/// Breadth-first depth of every node below `root`.
///
/// `None` marks nodes with no is-a path to the root (including the root's own
/// ancestors). An out-of-range root yields all `None`.
fn depths_from(view: &GraphView, root: NodeIndex) -> Vec<Option<u32>> {
    let mut depths = vec![None; view.node_count];
    if root >= view.node_count {
        return depths;
    }

    let mut queue = VecDeque::new();
    depths[root] = Some(0);
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        let next_depth = depths[current].map(|d| d + 1);
        for &child in view.successors(current) {
            if depths[child].is_none() {
                depths[child] = next_depth;
                queue.push_back(child);
            }
        }
    }

    depths
}

/// Parent-of-record for every node: the smallest-index parent lying exactly
/// one layer closer to the root.
///
/// The root and unreachable nodes have no parent-of-record.
fn parents_of_record(view: &GraphView, depths: &[Option<u32>]) -> Vec<Option<NodeIndex>> {
    (0..view.node_count)
        .map(|idx| match depths[idx] {
            Some(depth) if depth > 0 => view
                .predecessors(idx)
                .iter()
                .copied()
                .find(|&parent| depths[parent] == Some(depth - 1)),
            _ => None,
        })
        .collect()
}

/// Depth layering of a view relative to a designated root
#[derive(Debug, Clone, Default)]
pub struct DepthLayering {
    pub root: Option<NodeIndex>,
    pub depths: Vec<Option<u32>>,
    pub parents: Vec<Option<NodeIndex>>,
}

impl DepthLayering {
    /// Compute depths and parents-of-record for `root`
    pub fn new(view: &GraphView, root: Option<NodeIndex>) -> Self {
        let depths = match root {
            Some(root) => depths_from(view, root),
            None => vec![None; view.node_count],
        };
        let parents = parents_of_record(view, &depths);
        Self {
            root: root.filter(|&r| r < view.node_count),
            depths,
            parents,
        }
    }

    pub fn depth(&self, idx: NodeIndex) -> Option<u32> {
        self.depths.get(idx).copied().flatten()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.parents.get(idx).copied().flatten()
    }

    /// Deepest layer reached from the root
    pub fn max_depth(&self) -> u32 {
        self.depths.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Shortest path from `idx` up to the root, following parents-of-record.
///
/// Starts with `idx` and ends with the root; `None` when `idx` has no path.
pub fn path_to_root(layering: &DepthLayering, idx: NodeIndex) -> Option<Vec<NodeIndex>> {
    let depth = layering.depth(idx)?;
    let mut path = Vec::with_capacity(depth as usize + 1);
    let mut current = idx;
    path.push(current);
    // Each hop strictly lowers the depth, so the walk ends at the root
    while let Some(parent) = layering.parent(current) {
        path.push(parent);
        current = parent;
    }
    Some(path)
}
