//! Persisted artifacts: the run configuration and one jsonlist per term.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::corpus::DocumentId;
use crate::core::{term_file_in, Result, RunConfig, RunLayout};

/// Top-k substitutes for one occurrence, highest probability first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutePrediction {
    pub line_id: DocumentId,
    pub token_index: usize,
    pub top_terms: Vec<String>,
    pub top_term_probs: Vec<f32>,
}

/// Write the resolved run parameters to the layout's `config.json`.
pub fn write_run_config(layout: &RunLayout, config: &RunConfig) -> Result<PathBuf> {
    fs::create_dir_all(&layout.output_dir)?;
    let path = layout.config_file();
    let mut writer = BufWriter::new(fs::File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, config)?;
    writer.flush()?;
    Ok(path)
}

/// Write every prediction for `term` as one JSON object per line.
///
/// The file only appears under its final name once all records are on disk.
pub fn write_term_file(
    output_dir: &Path,
    term: &str,
    predictions: &[SubstitutePrediction],
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = term_file_in(output_dir, term);

    let temp_file = NamedTempFile::new_in(output_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        for prediction in predictions {
            serde_json::to_writer(&mut writer, prediction)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    temp_file.persist(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;

    #[test]
    fn term_file_has_one_record_per_line() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let predictions = vec![
            SubstitutePrediction {
                line_id: DocumentId::Int(4),
                token_index: 2,
                top_terms: vec!["dog".into(), "bird".into()],
                top_term_probs: vec![0.5, 0.25],
            },
            SubstitutePrediction {
                line_id: "x".into(),
                token_index: 0,
                top_terms: vec!["mouse".into(), "horse".into()],
                top_term_probs: vec![0.4, 0.1],
            },
        ];

        let path = write_term_file(dir.path(), "cat", &predictions)?;
        assert_eq!(path, dir.path().join("cat_substitutes.jsonlist"));

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0])?;
        assert_eq!(first["line_id"], 4);
        assert_eq!(first["token_index"], 2);
        assert_eq!(first["top_terms"][1], "bird");
        let second: SubstitutePrediction = serde_json::from_str(lines[1])?;
        assert_eq!(second, predictions[1]);

        // only the final file remains in the directory
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn run_config_is_pretty_json() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = RunConfig::new(dir.path(), Language::Eng);
        let layout = config.layout();
        let path = write_run_config(&layout, &config)?;
        assert_eq!(path, layout.output_dir.join("config.json"));
        let content = fs::read_to_string(path)?;
        assert!(content.contains("\n  \"top_k\": 11"));
        Ok(())
    }
}
