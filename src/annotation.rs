//! Record-to-term annotations
//!
//! Annotations are supplied by the caller and never stored here. Counting
//! them turns a cohort into the count map consumed by consolidation.

use crate::ontology::TermId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One record annotated with one term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub record: String,
    pub term: TermId,
}

impl Annotation {
    pub fn new(record: impl Into<String>, term: impl Into<TermId>) -> Self {
        Self {
            record: record.into(),
            term: term.into(),
        }
    }
}

/// Number of distinct records per term
pub fn count_annotations<'a, I>(annotations: I) -> BTreeMap<TermId, u64>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    let mut records: BTreeMap<&TermId, BTreeSet<&str>> = BTreeMap::new();
    for annotation in annotations {
        records
            .entry(&annotation.term)
            .or_default()
            .insert(annotation.record.as_str());
    }
    records
        .into_iter()
        .map(|(term, set)| (term.clone(), set.len() as u64))
        .collect()
}
