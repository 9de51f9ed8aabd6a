//! Loading of pretrained checkpoints and tokenizers.
//!
//! A fine-tuned model directory (as written by `save_pretrained`) is the
//! primary source. Its tokenizer may be stored either as `tokenizer.json` or
//! as a bare WordPiece `vocab.txt`; when both are absent the tokenizer of the
//! base model is fetched from Hugging Face Hub.
//!
//! ## Main Types
//!
//! - [`HfLoader`] - Generic Hugging Face file loader
//! - [`TokenizerLoader`] - Local-first tokenizer loading with hub fallback
//! - [`BertModelLoader`] - Loads `config.json` plus safetensors / pth weights

use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::Api as HfApi;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::Tokenizer;

use crate::core::{Result, SubstituteError};
use crate::models::implementations::bert::{load_masked_lm, BertLMHead, BertModel, Config};
use crate::pipelines::substitution::vocab::UNK_TOKEN;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = HfApi::new()?;
        let hf_api = hf_api.model(self.repo.clone());
        Ok(hf_api.get(self.filename.as_str())?)
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub model_dir: PathBuf,
    pub base_model: Option<String>,
    pub strip_accents: Option<bool>,
    pub lowercase: bool,
}

impl TokenizerLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            base_model: None,
            strip_accents: None,
            lowercase: true,
        }
    }

    /// Hub repository used when the model directory carries no tokenizer.
    pub fn base_model(mut self, repo: impl Into<String>) -> Self {
        let repo = repo.into();
        self.lowercase = repo.contains("uncased");
        self.base_model = Some(repo);
        self
    }

    pub fn strip_accents(mut self, strip: bool) -> Self {
        self.strip_accents = Some(strip);
        self
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file = self.model_dir.join("tokenizer.json");
        let vocab_file = self.model_dir.join("vocab.txt");

        let mut tokenizer = if tokenizer_file.exists() {
            tokenizer_from_file(&tokenizer_file)?
        } else if vocab_file.exists() {
            let vocab = vocab_file.to_string_lossy();
            let wordpiece = WordPiece::from_file(vocab.as_ref())
                .unk_token(UNK_TOKEN.to_string())
                .build()
                .map_err(|e| SubstituteError::Tokenizer(format!("{}: {e}", vocab_file.display())))?;
            Tokenizer::new(wordpiece)
        } else if let Some(repo) = &self.base_model {
            tracing::info!(repo = %repo, "No local tokenizer, fetching from hub");
            tokenizer_from_file(&HfLoader::new(repo, "tokenizer.json").load()?)?
        } else {
            return Err(SubstituteError::MissingInput(tokenizer_file));
        };

        if let Some(strip) = self.strip_accents {
            tokenizer.with_normalizer(Some(BertNormalizer::new(
                true,
                true,
                Some(strip),
                self.lowercase,
            )));
        }

        Ok(tokenizer)
    }
}

fn tokenizer_from_file(path: &Path) -> Result<Tokenizer> {
    Tokenizer::from_file(path)
        .map_err(|e| SubstituteError::Tokenizer(format!("{}: {e}", path.display())))
}

/// Loads a BERT masked-LM checkpoint from a local directory.
#[derive(Debug, Clone)]
pub struct BertModelLoader {
    pub model_dir: PathBuf,
}

impl BertModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        let config_file = self.model_dir.join("config.json");
        if !config_file.exists() {
            return Err(SubstituteError::MissingInput(config_file));
        }
        let content = std::fs::read_to_string(&config_file)?;
        serde_json::from_str(&content).map_err(|e| SubstituteError::MalformedInput {
            path: config_file,
            reason: e.to_string(),
        })
    }

    /// Returns the encoder and masked-LM head as separate handles.
    pub fn load(&self, device: &Device) -> Result<(Config, BertModel, BertLMHead)> {
        let config = self.load_config()?;

        let safetensors = self.model_dir.join("model.safetensors");
        let pth = self.model_dir.join("pytorch_model.bin");
        let dtype = DType::F32;

        let vb = if safetensors.exists() {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&safetensors], dtype, device)? }
        } else if pth.exists() {
            VarBuilder::from_pth(&pth, dtype, device)?
        } else {
            return Err(SubstituteError::ModelLoad(format!(
                "no weights in {}: expected `model.safetensors` or `pytorch_model.bin`",
                self.model_dir.display()
            )));
        };

        let (encoder, head) = load_masked_lm(vb, &config)
            .map_err(|e| SubstituteError::ModelLoad(format!("{}: {e}", self.model_dir.display())))?;

        tracing::info!(
            layers = encoder.num_layers(),
            vocab_size = config.vocab_size,
            hidden_size = config.hidden_size,
            "Loaded BERT masked-LM"
        );
        Ok((config, encoder, head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocab_txt_fallback() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("vocab.txt"),
            "[PAD]\n[UNK]\n[CLS]\n[SEP]\n[MASK]\nthe\ncat\n",
        )?;
        let tokenizer = TokenizerLoader::new(dir.path()).load()?;
        assert_eq!(tokenizer.token_to_id("cat"), Some(6));
        assert_eq!(tokenizer.get_vocab_size(true), 7);
        Ok(())
    }

    #[test]
    fn missing_tokenizer_without_base_model() {
        let dir = tempfile::tempdir().unwrap();
        let result = TokenizerLoader::new(dir.path()).load();
        assert!(matches!(result, Err(SubstituteError::MissingInput(_))));
    }

    #[test]
    fn missing_config_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BertModelLoader::new(dir.path()).load(&Device::Cpu);
        assert!(matches!(result, Err(SubstituteError::MissingInput(_))));
    }
}
