//! Reference list carried after the reference marker

use crate::Result;
use serde::{Deserialize, Serialize};

/// A grounding reference attached to an assistant answer
///
/// Wire form is a two-element JSON array: the display label (source file
/// name with a `(p.N)` page suffix) followed by the source document URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Reference {
    /// Display label, e.g. `manual.pdf(p.4)`
    pub label: String,
    /// Source document URL
    pub source: String,
}

impl Reference {
    /// Create a reference from a label and source URL
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }

    /// The label without its page suffix
    pub fn file_name(&self) -> &str {
        match self.label.find("(p") {
            Some(idx) => &self.label[..idx],
            None => &self.label,
        }
    }
}

impl From<(String, String)> for Reference {
    fn from((label, source): (String, String)) -> Self {
        Self { label, source }
    }
}

impl From<Reference> for (String, String) {
    fn from(reference: Reference) -> Self {
        (reference.label, reference.source)
    }
}

/// Decode a reference list from its JSON wire form
pub fn decode_references(json: &str) -> Result<Vec<Reference>> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a reference list to its JSON wire form
pub fn encode_references(references: &[Reference]) -> Result<String> {
    Ok(serde_json::to_string(references)?)
}
