use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubstituteError {
    // Inputs and configuration
    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Malformed input {}: {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Special token {0:?} missing from vocabulary")]
    MissingSpecialToken(String),

    #[error("Device error: {0}")]
    Device(String),

    // Occurrence resolution
    #[error("Document {0} not found in corpus")]
    UnknownDocument(String),

    #[error("Token index {index} out of range for document {document} ({len} tokens)")]
    TokenIndexOutOfRange {
        document: String,
        index: usize,
        len: usize,
    },

    // Scoring
    #[error("Inference failed on a batch of {batch_len} instances: {source}")]
    Inference {
        batch_len: usize,
        #[source]
        source: candle_core::Error,
    },

    #[error("Only {found} of {wanted} valid substitutes found after scanning all {vocab_size} vocabulary entries")]
    InsufficientCandidates {
        found: usize,
        wanted: usize,
        vocab_size: usize,
    },

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SubstituteError>;

impl From<hf_hub::api::sync::ApiError> for SubstituteError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        SubstituteError::ModelLoad(value.to_string())
    }
}

impl From<tempfile::PersistError> for SubstituteError {
    fn from(value: tempfile::PersistError) -> Self {
        SubstituteError::Io(value.error)
    }
}
