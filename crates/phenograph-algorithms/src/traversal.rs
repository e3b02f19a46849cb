//! Reachability closures
//!
//! Ancestor / descendant sets are plain BFS over the CSR rows. The visited
//! bitmap bounds every traversal by the node count, cycles included.

use super::common::{GraphView, NodeIndex};
use std::collections::VecDeque;

/// Which way to follow edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards parents (predecessors)
    Up,
    /// Towards children (successors)
    Down,
}

/// All nodes reachable from `sources` in `direction`, sources included.
///
/// Out-of-range sources are ignored. The result is sorted ascending.
pub fn reachable(view: &GraphView, sources: &[NodeIndex], direction: Direction) -> Vec<NodeIndex> {
    let mut visited = vec![false; view.node_count];
    let mut queue = VecDeque::new();

    for &source in sources {
        if source < view.node_count && !visited[source] {
            visited[source] = true;
            queue.push_back(source);
        }
    }

    while let Some(current) = queue.pop_front() {
        let next = match direction {
            Direction::Up => view.predecessors(current),
            Direction::Down => view.successors(current),
        };
        for &idx in next {
            if !visited[idx] {
                visited[idx] = true;
                queue.push_back(idx);
            }
        }
    }

    visited
        .iter()
        .enumerate()
        .filter_map(|(idx, &seen)| if seen { Some(idx) } else { None })
        .collect()
}
