//! Tokenized corpus documents, loaded once and looked up by id.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Result, SubstituteError};

/// Document identifier as it appears in the upstream `all.jsonlist`.
///
/// Upstream stages emit either integers or strings; both are accepted and
/// echoed back unchanged in the output records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    Str(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Int(id) => write!(f, "{id}"),
            DocumentId::Str(id) => write!(f, "{id:?}"),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(value: i64) -> Self {
        DocumentId::Int(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        DocumentId::Str(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: HashMap<DocumentId, Document>,
}

impl Corpus {
    /// Read a line-delimited JSON document collection. Blank lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SubstituteError::MissingInput(path.to_path_buf()));
        }

        let reader = BufReader::new(File::open(path)?);
        let mut documents = HashMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let document: Document =
                serde_json::from_str(&line).map_err(|e| SubstituteError::MalformedInput {
                    path: path.to_path_buf(),
                    reason: format!("line {}: {e}", line_no + 1),
                })?;
            documents.insert(document.id.clone(), document);
        }

        tracing::info!(documents = documents.len(), path = %path.display(), "Loaded corpus");
        Ok(Self { documents })
    }

    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|doc| (doc.id.clone(), doc))
                .collect(),
        }
    }

    pub fn get(&self, id: &DocumentId) -> Result<&Document> {
        self.documents
            .get(id)
            .ok_or_else(|| SubstituteError::UnknownDocument(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_mixed_id_types() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, r#"{{"id": 1, "tokens": ["the", "cat", "sat"]}}"#)?;
        writeln!(file)?;
        writeln!(file, r#"{{"id": "doc-2", "tokens": ["a", "dog"]}}"#)?;

        let corpus = Corpus::load(file.path())?;
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(&DocumentId::Int(1))?.tokens[1], "cat");
        assert_eq!(corpus.get(&"doc-2".into())?.tokens.len(), 2);
        assert!(matches!(
            corpus.get(&DocumentId::Int(3)),
            Err(SubstituteError::UnknownDocument(_))
        ));
        Ok(())
    }

    #[test]
    fn malformed_line_reports_position() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, r#"{{"id": 1, "tokens": ["ok"]}}"#)?;
        writeln!(file, r#"{{"id": 2}}"#)?;

        match Corpus::load(file.path()) {
            Err(SubstituteError::MalformedInput { reason, .. }) => {
                assert!(reason.starts_with("line 2"))
            }
            other => panic!("expected malformed input, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let result = Corpus::load(Path::new("/nonexistent/all.jsonlist"));
        assert!(matches!(result, Err(SubstituteError::MissingInput(_))));
    }
}
