//! Target term index: term -> occurrences `[document_id, token_index]`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::corpus::DocumentId;
use crate::core::{Result, SubstituteError};

/// One appearance of a target term, located by document and token position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(DocumentId, usize)", into = "(DocumentId, usize)")]
pub struct Occurrence {
    pub document: DocumentId,
    pub token_index: usize,
}

impl Occurrence {
    pub fn new(document: impl Into<DocumentId>, token_index: usize) -> Self {
        Self {
            document: document.into(),
            token_index,
        }
    }
}

impl From<(DocumentId, usize)> for Occurrence {
    fn from((document, token_index): (DocumentId, usize)) -> Self {
        Self {
            document,
            token_index,
        }
    }
}

impl From<Occurrence> for (DocumentId, usize) {
    fn from(value: Occurrence) -> Self {
        (value.document, value.token_index)
    }
}

/// Occurrence lists keyed by target term. Iterates terms in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TargetIndex {
    terms: BTreeMap<String, Vec<Occurrence>>,
}

impl TargetIndex {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SubstituteError::MissingInput(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let index: TargetIndex =
            serde_json::from_str(&content).map_err(|e| SubstituteError::MalformedInput {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        tracing::info!(terms = index.len(), path = %path.display(), "Loaded target index");
        Ok(index)
    }

    pub fn insert(&mut self, term: impl Into<String>, occurrences: Vec<Occurrence>) {
        self.terms.insert(term.into(), occurrences);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Occurrence])> {
        self.terms
            .iter()
            .map(|(term, occurrences)| (term.as_str(), occurrences.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<(String, Vec<Occurrence>)> for TargetIndex {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Occurrence>)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_sorts_terms() -> anyhow::Result<()> {
        let raw = r#"{"plane_nn": [[3, 7], [1, 0]], "attack_nn": [["a", 2]]}"#;
        let index: TargetIndex = serde_json::from_str(raw)?;
        let terms: Vec<&str> = index.iter().map(|(term, _)| term).collect();
        assert_eq!(terms, ["attack_nn", "plane_nn"]);

        let (_, plane) = index.iter().nth(1).unwrap();
        assert_eq!(plane[0], Occurrence::new(3i64, 7));
        assert_eq!(plane[1], Occurrence::new(1i64, 0));
        Ok(())
    }

    #[test]
    fn rejects_non_pair_entries() {
        let raw = r#"{"cat": [[1, 2, 3]]}"#;
        assert!(serde_json::from_str::<TargetIndex>(raw).is_err());
    }
}
