//! Non-fatal diagnostics
//!
//! Unknown or disconnected terms never abort a query. They are collected
//! next to the best-effort result so callers can surface them.

use crate::ontology::TermId;
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A non-fatal condition met while answering a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Requested id is not a node (nor an alternate id) of the graph
    UnknownTerm { id: String },
    /// Term has no is-a path to the designated root
    Disconnected { id: TermId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownTerm { id } => write!(f, "unknown term {}", id),
            Diagnostic::Disconnected { id } => write!(f, "term {} has no path to the root", id),
        }
    }
}

/// Insertion-ordered, duplicate-free set of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: IndexSet<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic; repeats are ignored
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.items.contains(&diagnostic) {
            warn!("{}", diagnostic);
            self.items.insert(diagnostic);
        }
    }

    pub fn unknown_term(&mut self, id: impl Into<String>) {
        self.push(Diagnostic::UnknownTerm { id: id.into() });
    }

    pub fn disconnected(&mut self, id: TermId) {
        self.push(Diagnostic::Disconnected { id });
    }

    /// Merge another collection, keeping first-seen order
    pub fn extend(&mut self, other: Diagnostics) {
        for diagnostic in other.items {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids reported as unknown
    pub fn unknown_terms(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|d| match d {
                Diagnostic::UnknownTerm { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items.into_iter().collect()
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}
