//! Ancestor / descendant closures
//!
//! A `ClosureEngine` is a short-lived session over one graph. Repeated
//! queries for the same term and direction are answered from a small LRU
//! cache instead of traversing again.

use crate::diagnostics::Diagnostics;
use crate::ontology::{Ontology, TermId};
use lru::LruCache;
use phenograph_algorithms::{reachable, Direction, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Default number of cached traversals per session
pub const DEFAULT_CLOSURE_CACHE_CAPACITY: usize = 256;

/// Result of a closure query: primary ids, inputs included (unknown inputs
/// verbatim), plus diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Closure {
    pub terms: BTreeSet<TermId>,
    pub diagnostics: Diagnostics,
}

impl Closure {
    pub fn contains(&self, id: &str) -> bool {
        self.terms.contains(id)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TermId> {
        self.terms.iter()
    }
}

/// Phenotype selection supplied by a cohort filter UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenotypeFilter {
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// Descendant-closed include / exclude sets for a [`PhenotypeFilter`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSets {
    pub include: BTreeSet<TermId>,
    pub exclude: BTreeSet<TermId>,
    /// False when nothing was selected, i.e. every record passes inclusion
    pub restricted: bool,
    pub diagnostics: Diagnostics,
}

impl FilterSets {
    /// Whether a record annotated with `terms` passes the filter
    pub fn admits<'t, I>(&self, terms: I) -> bool
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut included = !self.restricted;
        for term in terms {
            if self.exclude.contains(term) {
                return false;
            }
            included |= self.include.contains(term);
        }
        included
    }
}

/// Closure query session over one [`Ontology`]
pub struct ClosureEngine<'a> {
    ontology: &'a Ontology,
    cache: LruCache<(Direction, NodeIndex), Rc<Vec<NodeIndex>>>,
}

impl<'a> ClosureEngine<'a> {
    pub fn new(ontology: &'a Ontology) -> Self {
        Self::with_capacity(ontology, DEFAULT_CLOSURE_CACHE_CAPACITY)
    }

    pub fn with_capacity(ontology: &'a Ontology, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ontology,
            cache: LruCache::new(capacity),
        }
    }

    pub fn ontology(&self) -> &'a Ontology {
        self.ontology
    }

    /// The term and all of its ancestors
    pub fn ancestors(&mut self, id: &str) -> Closure {
        self.closure_of_any([id], Direction::Up)
    }

    /// The term and all of its descendants
    pub fn descendants(&mut self, id: &str) -> Closure {
        self.closure_of_any([id], Direction::Down)
    }

    pub fn ancestors_of_any<I, S>(&mut self, ids: I) -> Closure
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.closure_of_any(ids, Direction::Up)
    }

    pub fn descendants_of_any<I, S>(&mut self, ids: I) -> Closure
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.closure_of_any(ids, Direction::Down)
    }

    /// Resolve a filter into descendant-closed include and exclude sets
    pub fn filter_sets(&mut self, filter: &PhenotypeFilter) -> FilterSets {
        let include = self.descendants_of_any(&filter.selected);
        let exclude = self.descendants_of_any(&filter.excluded);

        let mut diagnostics = include.diagnostics;
        diagnostics.extend(exclude.diagnostics);

        FilterSets {
            include: include.terms,
            exclude: exclude.terms,
            restricted: !filter.selected.is_empty(),
            diagnostics,
        }
    }

    /// Number of traversals currently cached
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn closure_of_any<I, S>(&mut self, ids: I, direction: Direction) -> Closure
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut diagnostics = Diagnostics::new();
        let mut indices = BTreeSet::new();
        // Unknown inputs are their own (empty) closure
        let mut unresolved = BTreeSet::new();

        for id in ids {
            let id = id.as_ref();
            match self.ontology.index_of(id) {
                Some(idx) => indices.extend(self.reach(idx, direction).iter().copied()),
                None => {
                    diagnostics.unknown_term(id);
                    unresolved.insert(TermId::new(id));
                }
            }
        }

        let mut terms: BTreeSet<TermId> = indices
            .into_iter()
            .map(|idx| self.ontology.id_at(idx).clone())
            .collect();
        terms.extend(unresolved);

        Closure { terms, diagnostics }
    }

    /// Sorted node indices reachable from `idx`, itself included
    pub(crate) fn reach(&mut self, idx: NodeIndex, direction: Direction) -> Rc<Vec<NodeIndex>> {
        if let Some(hit) = self.cache.get(&(direction, idx)) {
            return Rc::clone(hit);
        }
        let result = Rc::new(reachable(self.ontology.view(), &[idx], direction));
        self.cache.put((direction, idx), Rc::clone(&result));
        result
    }
}
