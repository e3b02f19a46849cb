//! Immutable is-a graph store
//!
//! Terms are interned into dense indices in ascending identifier order, so
//! "smallest index" and "lexicographically smallest id" coincide. Every
//! deterministic tie-break in the engines relies on that.

use super::term::{Term, TermId};
use crate::config::DEFAULT_ROOT_TERM;
use crate::obo::{OboDocument, TermFrame};
use chrono::{DateTime, Utc};
use phenograph_algorithms::{
    back_edges, path_to_root, reachable, DepthLayering, Direction, GraphView, NodeIndex,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Collects terms and is-a edges, then freezes them into an [`Ontology`]
#[derive(Debug, Clone)]
pub struct OntologyBuilder {
    terms: BTreeMap<TermId, Term>,
    alt_ids: BTreeMap<String, TermId>,
    /// (parent, child)
    edges: BTreeSet<(TermId, TermId)>,
    root: TermId,
    version: Option<String>,
}

impl Default for OntologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyBuilder {
    pub fn new() -> Self {
        Self {
            terms: BTreeMap::new(),
            alt_ids: BTreeMap::new(),
            edges: BTreeSet::new(),
            root: TermId::new(DEFAULT_ROOT_TERM),
            version: None,
        }
    }

    /// Builder pre-filled with every term frame of a parsed document
    pub fn from_document(doc: &OboDocument) -> Self {
        let mut builder = Self::new();
        builder.version = doc.header.data_version.clone();
        for frame in &doc.frames {
            builder.add_frame(frame);
        }
        builder
    }

    pub fn with_root(mut self, root: impl Into<TermId>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a parsed frame and its is_a edges
    pub fn add_frame(&mut self, frame: &TermFrame) {
        self.add_term(Term::from(frame));
        for parent in &frame.is_a {
            self.add_is_a(parent.as_str(), frame.id.as_str());
        }
    }

    /// Add a term. A real definition replaces a placeholder; a second real
    /// definition of the same id is ignored.
    pub fn add_term(&mut self, term: Term) {
        if let Some(existing) = self.terms.get(&term.id) {
            if !existing.placeholder {
                warn!("Duplicate definition of {}, keeping the first one", term.id);
                return;
            }
        }
        for alt in &term.alt_ids {
            self.alt_ids
                .entry(alt.clone())
                .or_insert_with(|| term.id.clone());
        }
        self.terms.insert(term.id.clone(), term);
    }

    /// Add a parent -> child is-a edge; unseen endpoints become placeholders
    pub fn add_is_a(&mut self, parent: impl Into<TermId>, child: impl Into<TermId>) {
        let parent = parent.into();
        let child = child.into();
        if parent == child {
            warn!("Ignoring self is_a on {}", child);
            return;
        }
        self.add_placeholder(parent.clone());
        self.add_placeholder(child.clone());
        self.edges.insert((parent, child));
    }

    /// Ensure a node exists for `id`. Returns true if a placeholder was created.
    pub fn add_placeholder(&mut self, id: impl Into<TermId>) -> bool {
        let id = id.into();
        if self.terms.contains_key(&id) {
            return false;
        }
        self.terms.insert(id.clone(), Term::placeholder(id));
        true
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Freeze into an immutable store, precomputing depth and parents-of-record
    pub fn build(self) -> Ontology {
        let OntologyBuilder {
            terms,
            alt_ids,
            edges,
            root,
            version,
        } = self;

        let terms: Vec<Term> = terms.into_values().collect();
        let index: FxHashMap<TermId, NodeIndex> = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.id.clone(), idx))
            .collect();

        // A primary id always wins over an alternate id with the same spelling
        let alt_index: FxHashMap<String, NodeIndex> = alt_ids
            .into_iter()
            .filter(|(alt, _)| !index.contains_key(alt.as_str()))
            .filter_map(|(alt, primary)| index.get(&primary).map(|&idx| (alt, idx)))
            .collect();

        let pairs: Vec<(NodeIndex, NodeIndex)> = edges
            .iter()
            .filter_map(|(parent, child)| Some((*index.get(parent)?, *index.get(child)?)))
            .collect();
        let view = GraphView::from_edges(terms.len(), &pairs);

        let cycle_edges = back_edges(&view);
        for &(parent, child) in &cycle_edges {
            warn!(
                "is_a cycle: edge {} -> {} closes a loop",
                terms[parent].id, terms[child].id
            );
        }

        let root_index = index.get(&root).copied();
        if root_index.is_none() && !terms.is_empty() {
            warn!("Root term {} is not in the ontology; no term has a path to it", root);
        }

        let layering = DepthLayering::new(&view, root_index);
        let mut trivial_roots = vec![false; terms.len()];
        if let Some(root_index) = root_index {
            for idx in reachable(&view, &[root_index], Direction::Up) {
                trivial_roots[idx] = true;
            }
        }

        info!(
            "Built ontology: {} terms, {} is-a edges, root {}, data-version {}",
            terms.len(),
            view.edge_count(),
            root,
            version.as_deref().unwrap_or("unknown")
        );
        debug!("Maximum depth below root: {}", layering.max_depth());

        Ontology {
            terms,
            index,
            alt_index,
            view,
            layering,
            trivial_roots,
            root,
            version,
            loaded_at: Utc::now(),
            cycle_edge_count: cycle_edges.len(),
        }
    }
}

/// Summary figures of a built ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OntologyStatistics {
    pub term_count: usize,
    pub edge_count: usize,
    pub obsolete_count: usize,
    pub placeholder_count: usize,
    /// Terms with no is-a path to the root (root ancestors included)
    pub disconnected_count: usize,
    pub max_depth: u32,
    pub cycle_edge_count: usize,
    pub root: TermId,
    pub data_version: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// The built, read-only is-a graph
#[derive(Debug)]
pub struct Ontology {
    terms: Vec<Term>,
    index: FxHashMap<TermId, NodeIndex>,
    alt_index: FxHashMap<String, NodeIndex>,
    view: GraphView,
    layering: DepthLayering,
    trivial_roots: Vec<bool>,
    root: TermId,
    version: Option<String>,
    loaded_at: DateTime<Utc>,
    cycle_edge_count: usize,
}

impl Ontology {
    /// Dense index of a primary or alternate id
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index
            .get(id)
            .or_else(|| self.alt_index.get(id))
            .copied()
    }

    /// Primary id for a primary or alternate id
    pub fn resolve(&self, id: &str) -> Option<&TermId> {
        self.index_of(id).map(|idx| &self.terms[idx].id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn term(&self, id: &str) -> Option<&Term> {
        self.index_of(id).map(|idx| &self.terms[idx])
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.term(id).map(|t| t.label.as_str())
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Designated root term
    pub fn root(&self) -> &TermId {
        &self.root
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Direct parents, in identifier order
    pub fn parents(&self, id: &str) -> Vec<&TermId> {
        self.index_of(id)
            .map(|idx| self.ids(self.view.predecessors(idx)))
            .unwrap_or_default()
    }

    /// Direct children, in identifier order
    pub fn children(&self, id: &str) -> Vec<&TermId> {
        self.index_of(id)
            .map(|idx| self.ids(self.view.successors(idx)))
            .unwrap_or_default()
    }

    /// Shortest is-a distance to the root; `None` when disconnected or unknown
    pub fn depth(&self, id: &str) -> Option<u32> {
        self.index_of(id).and_then(|idx| self.layering.depth(idx))
    }

    /// Smallest-id parent among those one step closer to the root
    pub fn parent_of_record(&self, id: &str) -> Option<&TermId> {
        self.index_of(id)
            .and_then(|idx| self.layering.parent(idx))
            .map(|idx| &self.terms[idx].id)
    }

    /// Shortest path `[id, ..., root]` following parents-of-record
    pub fn path_to_root(&self, id: &str) -> Option<Vec<&TermId>> {
        let idx = self.index_of(id)?;
        path_to_root(&self.layering, idx).map(|path| self.ids(&path))
    }

    pub fn statistics(&self) -> OntologyStatistics {
        OntologyStatistics {
            term_count: self.terms.len(),
            edge_count: self.view.edge_count(),
            obsolete_count: self.terms.iter().filter(|t| t.obsolete).count(),
            placeholder_count: self.terms.iter().filter(|t| t.placeholder).count(),
            disconnected_count: self.layering.depths.iter().filter(|d| d.is_none()).count(),
            max_depth: self.layering.max_depth(),
            cycle_edge_count: self.cycle_edge_count,
            root: self.root.clone(),
            data_version: self.version.clone(),
            loaded_at: self.loaded_at,
        }
    }

    pub(crate) fn view(&self) -> &GraphView {
        &self.view
    }

    pub(crate) fn layering(&self) -> &DepthLayering {
        &self.layering
    }

    pub(crate) fn term_at(&self, idx: NodeIndex) -> &Term {
        &self.terms[idx]
    }

    pub(crate) fn id_at(&self, idx: NodeIndex) -> &TermId {
        &self.terms[idx].id
    }

    /// The root or one of its ancestors
    pub(crate) fn is_trivial_root(&self, idx: NodeIndex) -> bool {
        self.trivial_roots.get(idx).copied().unwrap_or(false)
    }

    fn ids(&self, indices: &[NodeIndex]) -> Vec<&TermId> {
        indices.iter().map(|&idx| &self.terms[idx].id).collect()
    }
}
