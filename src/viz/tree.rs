//! Minimal display tree for a set of used terms
//!
//! The node set is every used term plus all of its root-connected
//! ancestors. Edges are those of the induced subgraph. Because the
//! hierarchy is a DAG, a term with two parents in the set is shown under
//! both of them.

use crate::diagnostics::Diagnostics;
use crate::engine::ClosureEngine;
use crate::ontology::{Ontology, TermId};
use phenograph_algorithms::{Direction, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A node of the display forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: TermId,
    pub label: String,
    /// Selectable term, as opposed to a structural ancestor
    pub used: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(id: TermId, label: String, used: bool) -> Self {
        Self {
            id,
            label,
            used,
            children: Vec::new(),
        }
    }

    /// Nodes in this subtree, repeats under multiple parents counted each time
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    fn display_order(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Rooted forest ready for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayTree {
    pub roots: Vec<TreeNode>,
    pub diagnostics: Diagnostics,
}

impl DisplayTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

struct ForestBuilder<'o> {
    ontology: &'o Ontology,
    members: BTreeSet<NodeIndex>,
    used: BTreeSet<NodeIndex>,
    memo: FxHashMap<NodeIndex, TreeNode>,
    on_path: FxHashSet<NodeIndex>,
}

impl<'o> ForestBuilder<'o> {
    fn node(&mut self, idx: NodeIndex) -> TreeNode {
        if let Some(done) = self.memo.get(&idx) {
            return done.clone();
        }
        self.on_path.insert(idx);

        let ontology = self.ontology;
        let mut children = Vec::new();
        for &child in ontology.view().successors(idx) {
            // on_path only matters for malformed, cyclic input
            if self.members.contains(&child) && !self.on_path.contains(&child) {
                children.push(self.node(child));
            }
        }
        children.sort_by(TreeNode::display_order);

        self.on_path.remove(&idx);
        let term = ontology.term_at(idx);
        let node = TreeNode {
            children,
            ..TreeNode::leaf(term.id.clone(), term.label.clone(), self.used.contains(&idx))
        };
        self.memo.insert(idx, node.clone());
        node
    }
}

/// Build the minimal display forest for `used` ids.
///
/// Disconnected terms become their own roots; unknown ids are appended as
/// used leaf roots labelled by their id.
///
/// A term reachable along several paths is repeated under each parent, so
/// output size grows with the number of root-to-term paths rather than with
/// the number of terms. Pass the terms a user can pick from, not a whole
/// cohort's annotations.
pub fn build_display_tree<I, S>(ontology: &Ontology, used: I) -> DisplayTree
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut diagnostics = Diagnostics::new();
    let mut used_idx = BTreeSet::new();
    let mut unknown = BTreeSet::new();

    for id in used {
        let id = id.as_ref();
        match ontology.index_of(id) {
            Some(idx) => {
                used_idx.insert(idx);
            }
            None => {
                diagnostics.unknown_term(id);
                unknown.insert(id.to_string());
            }
        }
    }

    let layering = ontology.layering();
    let mut engine = ClosureEngine::new(ontology);
    let mut members = BTreeSet::new();
    for &idx in &used_idx {
        if layering.depth(idx).is_some() {
            members.extend(
                engine
                    .reach(idx, Direction::Up)
                    .iter()
                    .copied()
                    .filter(|&a| layering.depth(a).is_some()),
            );
        } else {
            diagnostics.disconnected(ontology.id_at(idx).clone());
            members.insert(idx);
        }
    }

    let top: Vec<NodeIndex> = members
        .iter()
        .copied()
        .filter(|&idx| {
            !ontology
                .view()
                .predecessors(idx)
                .iter()
                .any(|p| members.contains(p))
        })
        .collect();

    let mut builder = ForestBuilder {
        ontology,
        members,
        used: used_idx,
        memo: FxHashMap::default(),
        on_path: FxHashSet::default(),
    };
    let mut roots: Vec<TreeNode> = top.into_iter().map(|idx| builder.node(idx)).collect();
    roots.sort_by(TreeNode::display_order);
    roots.extend(
        unknown
            .into_iter()
            .map(|id| TreeNode::leaf(TermId::new(id.clone()), id, true)),
    );

    DisplayTree { roots, diagnostics }
}
