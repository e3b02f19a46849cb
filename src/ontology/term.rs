//! Term identifiers and term records

use crate::obo::{Synonym, TermFrame};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Namespace-qualified term identifier (e.g., "HP:0001250")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TermId(String);

impl TermId {
    pub fn new(id: impl Into<String>) -> Self {
        TermId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace prefix ("HP" for "HP:0001250"), if any
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(':').map(|(ns, _)| ns)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TermId {
    fn from(s: String) -> Self {
        TermId(s)
    }
}

impl From<&str> for TermId {
    fn from(s: &str) -> Self {
        TermId(s.to_string())
    }
}

impl Borrow<str> for TermId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TermId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single ontology term. Immutable once the store is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub label: String,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<Synonym>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_ids: Vec<String>,
    #[serde(default)]
    pub obsolete: bool,
    /// Node created from a reference only (is_a target or annotation id)
    #[serde(default)]
    pub placeholder: bool,
}

impl Term {
    pub fn new(id: impl Into<TermId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            synonyms: Vec::new(),
            alt_ids: Vec::new(),
            obsolete: false,
            placeholder: false,
        }
    }

    /// Node for an id that has no frame of its own; labelled by its id
    pub fn placeholder(id: impl Into<TermId>) -> Self {
        let id = id.into();
        let label = id.to_string();
        Self {
            placeholder: true,
            ..Self::new(id, label)
        }
    }
}

impl From<&TermFrame> for Term {
    fn from(frame: &TermFrame) -> Self {
        Self {
            id: TermId::new(frame.id.clone()),
            label: frame.label().to_string(),
            description: frame.def.clone(),
            synonyms: frame.synonyms.clone(),
            alt_ids: frame.alt_ids.clone(),
            obsolete: frame.obsolete,
            placeholder: false,
        }
    }
}
