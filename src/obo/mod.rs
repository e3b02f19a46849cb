//! OBO flat-file parser using Pest
//!
//! Only `[Term]` stanzas feed the graph. Inside a term frame the clauses the
//! engine understands are decoded into a fixed-shape [`TermFrame`]; every
//! other clause goes through the explicit [`Clause::Ignored`] path.

mod value;

use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Parser)]
#[grammar = "obo/obo.pest"]
struct OboParser;

/// Parser errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Pest parsing error
    #[error("Parse error: {0}")]
    PestError(#[from] Box<pest::error::Error<Rule>>),

    /// Input is not UTF-8
    #[error("Source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Header tags of an OBO document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OboHeader {
    pub format_version: Option<String>,
    pub data_version: Option<String>,
    pub ontology: Option<String>,
}

/// Synonym with its scope (EXACT, BROAD, NARROW, RELATED)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    pub text: String,
    pub scope: Option<String>,
}

/// One decoded tag-value line of a term frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Id(String),
    Name(String),
    Def(String),
    IsA(String),
    AltId(String),
    Synonym(Synonym),
    Obsolete(bool),
    /// Any clause this engine does not use (xref, comment, created_by, ...)
    Ignored { tag: String },
}

impl Clause {
    /// Decode a raw `tag: value` pair
    pub fn decode(tag: &str, raw: &str) -> Clause {
        let token = || value::first_token(raw).map(str::to_string);
        let decoded = match tag {
            "id" => token().map(Clause::Id),
            "name" => Some(Clause::Name(value::strip_trailing(raw).to_string())),
            "def" => value::quoted(raw).map(|(text, _)| Clause::Def(text)),
            "is_a" => token().map(Clause::IsA),
            "alt_id" => token().map(Clause::AltId),
            "synonym" => value::quoted(raw).map(|(text, rest)| {
                Clause::Synonym(Synonym {
                    text,
                    scope: value::first_token(rest)
                        .filter(|s| !s.starts_with('['))
                        .map(str::to_string),
                })
            }),
            "is_obsolete" => Some(Clause::Obsolete(value::strip_trailing(raw) == "true")),
            _ => None,
        };
        decoded.unwrap_or_else(|| Clause::Ignored { tag: tag.to_string() })
    }
}

/// A `[Term]` stanza folded into explicit optional fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrame {
    pub id: String,
    pub name: Option<String>,
    pub def: Option<String>,
    pub is_a: Vec<String>,
    pub alt_ids: Vec<String>,
    pub synonyms: Vec<Synonym>,
    pub obsolete: bool,
    /// Number of clauses skipped through [`Clause::Ignored`]
    pub ignored_clauses: usize,
}

impl TermFrame {
    /// Fold one clause into the frame. Single-valued clauses keep the first value.
    pub fn apply(&mut self, clause: Clause) {
        match clause {
            Clause::Id(id) => {
                if self.id.is_empty() {
                    self.id = id;
                }
            }
            Clause::Name(name) => {
                if self.name.is_none() && !name.is_empty() {
                    self.name = Some(name);
                }
            }
            Clause::Def(def) => {
                if self.def.is_none() {
                    self.def = Some(def);
                }
            }
            Clause::IsA(parent) => self.is_a.push(parent),
            Clause::AltId(alt) => self.alt_ids.push(alt),
            Clause::Synonym(synonym) => self.synonyms.push(synonym),
            Clause::Obsolete(flag) => self.obsolete |= flag,
            Clause::Ignored { .. } => self.ignored_clauses += 1,
        }
    }

    /// Display label; falls back to the identifier
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Parsed OBO document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OboDocument {
    pub header: OboHeader,
    pub frames: Vec<TermFrame>,
    /// Non-term stanzas plus term stanzas lacking an id
    pub skipped_stanzas: usize,
}

/// Parse raw bytes of an OBO file
pub fn parse_bytes(bytes: &[u8]) -> ParseResult<OboDocument> {
    parse_document(std::str::from_utf8(bytes)?)
}

/// Parse an OBO document
pub fn parse_document(input: &str) -> ParseResult<OboDocument> {
    let pairs = OboParser::parse(Rule::document, input).map_err(Box::new)?;

    let mut doc = OboDocument::default();

    for pair in pairs {
        if pair.as_rule() != Rule::document {
            continue;
        }
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::header => doc.header = parse_header(inner),
                Rule::stanza => parse_stanza(inner, &mut doc),
                Rule::EOI => break,
                _ => {}
            }
        }
    }

    debug!(
        "Parsed OBO document: {} term frames, {} skipped stanzas",
        doc.frames.len(),
        doc.skipped_stanzas
    );
    Ok(doc)
}

fn tag_value(pair: pest::iterators::Pair<Rule>) -> Option<(&str, &str)> {
    let mut inner = pair.into_inner();
    let tag = inner.next()?.as_str();
    let value = inner.next().map(|p| p.as_str()).unwrap_or("");
    Some((tag, value))
}

fn parse_header(pair: pest::iterators::Pair<Rule>) -> OboHeader {
    let mut header = OboHeader::default();
    for line in pair.into_inner() {
        if line.as_rule() != Rule::clause_line {
            continue;
        }
        if let Some((tag, raw)) = tag_value(line) {
            let value = Some(value::strip_trailing(raw).to_string()).filter(|v| !v.is_empty());
            match tag {
                "format-version" => header.format_version = value,
                "data-version" => header.data_version = value,
                "ontology" => header.ontology = value,
                _ => {}
            }
        }
    }
    header
}

fn parse_stanza(pair: pest::iterators::Pair<Rule>, doc: &mut OboDocument) {
    let mut inner = pair.into_inner();
    let kind = inner.next().map(|p| p.as_str().trim()).unwrap_or("");
    if kind != "Term" {
        doc.skipped_stanzas += 1;
        return;
    }

    let mut frame = TermFrame::default();
    for line in inner {
        match line.as_rule() {
            Rule::clause_line => {
                if let Some((tag, raw)) = tag_value(line) {
                    frame.apply(Clause::decode(tag, raw));
                }
            }
            Rule::other_line => frame.ignored_clauses += 1,
            _ => {}
        }
    }

    if frame.id.is_empty() {
        warn!("Skipping [Term] stanza without an id");
        doc.skipped_stanzas += 1;
        return;
    }
    doc.frames.push(frame);
}

/// Read `data-version` from the header without parsing the whole file
pub fn sniff_data_version(input: &str) -> Option<String> {
    for line in input.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            break;
        }
        if let Some(rest) = line.strip_prefix("data-version:") {
            let version = value::strip_trailing(rest);
            if !version.is_empty() {
                return Some(version.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"format-version: 1.2
data-version: hp/releases/2024-04-26
ontology: hp

[Term]
id: HP:0000001
name: All
comment: Root of all terms in the Human Phenotype Ontology.

[Term]
id: HP:0000118
name: Phenotypic abnormality
def: "A phenotypic abnormality." [HPO:probinson]
synonym: "Organ abnormality" EXACT []
is_a: HP:0000001 ! All

[Term]
id: HP:0001250
name: Seizure
alt_id: HP:0002279
xref: UMLS:C0036572
is_a: HP:0000118 {source="x"} ! Phenotypic abnormality
this line is garbage

[Typedef]
id: part_of
name: part of

[Term]
name: no id here

[Term]
id: HP:0000050
is_obsolete: true
replaced_by: HP:0000118"#;

    #[test]
    fn test_parse_header() {
        let doc = parse_document(SAMPLE).unwrap();
        assert_eq!(doc.header.format_version.as_deref(), Some("1.2"));
        assert_eq!(doc.header.data_version.as_deref(), Some("hp/releases/2024-04-26"));
        assert_eq!(doc.header.ontology.as_deref(), Some("hp"));
    }

    #[test]
    fn test_parse_term_frames() {
        let doc = parse_document(SAMPLE).unwrap();
        let ids: Vec<&str> = doc.frames.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["HP:0000001", "HP:0000118", "HP:0001250", "HP:0000050"]);
        // Typedef and the id-less term
        assert_eq!(doc.skipped_stanzas, 2);

        let root = &doc.frames[1];
        assert_eq!(root.label(), "Phenotypic abnormality");
        assert_eq!(root.def.as_deref(), Some("A phenotypic abnormality."));
        assert_eq!(root.is_a, vec!["HP:0000001"]);
        assert_eq!(root.synonyms[0].scope.as_deref(), Some("EXACT"));

        let seizure = &doc.frames[2];
        assert_eq!(seizure.is_a, vec!["HP:0000118"]);
        assert_eq!(seizure.alt_ids, vec!["HP:0002279"]);
        // xref clause and the garbage line
        assert_eq!(seizure.ignored_clauses, 2);
    }

    #[test]
    fn test_label_defaults_to_id() {
        let doc = parse_document(SAMPLE).unwrap();
        let obsolete = &doc.frames[3];
        assert!(obsolete.obsolete);
        assert_eq!(obsolete.label(), "HP:0000050");
        // replaced_by is not used by the engine
        assert_eq!(obsolete.ignored_clauses, 1);
    }

    #[test]
    fn test_decode_unknown_clause_is_ignored() {
        assert_eq!(
            Clause::decode("created_by", "peter"),
            Clause::Ignored { tag: "created_by".to_string() }
        );
        assert_eq!(Clause::decode("is_a", "   "), Clause::Ignored { tag: "is_a".to_string() });
    }

    #[test]
    fn test_crlf_and_empty_input() {
        let crlf = "data-version: v1\r\n\r\n[Term]\r\nid: X:1\r\nname: One\r\n";
        let doc = parse_document(crlf).unwrap();
        assert_eq!(doc.frames.len(), 1);
        assert_eq!(doc.frames[0].label(), "One");

        let empty = parse_document("").unwrap();
        assert!(empty.frames.is_empty());
    }

    #[test]
    fn test_sniff_data_version() {
        assert_eq!(sniff_data_version(SAMPLE).as_deref(), Some("hp/releases/2024-04-26"));
        assert_eq!(sniff_data_version("[Term]\ndata-version: late\n"), None);
    }
}
