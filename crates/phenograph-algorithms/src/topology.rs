//! Graph topology checks
//!
//! An is-a hierarchy must be acyclic. Malformed sources can still contain
//! cycles, so the store asks for the cycle-closing edges and reports them.

use super::common::{GraphView, NodeIndex};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Edges `(parent, child)` that close a cycle during a depth-first walk.
///
/// Roots are visited in ascending index order and children likewise, so the
/// reported edges are deterministic. Empty for a DAG.
pub fn back_edges(view: &GraphView) -> Vec<(NodeIndex, NodeIndex)> {
    let mut marks = vec![Mark::Unvisited; view.node_count];
    let mut found = Vec::new();

    for start in 0..view.node_count {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        // Iterative DFS: (node, position in successor row)
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        marks[start] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let children = view.successors(node);
            if top.1 < children.len() {
                let child = children[top.1];
                top.1 += 1;
                match marks[child] {
                    Mark::Unvisited => {
                        marks[child] = Mark::OnStack;
                        stack.push((child, 0));
                    }
                    Mark::OnStack => found.push((node, child)),
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
            }
        }
    }

    found
}
