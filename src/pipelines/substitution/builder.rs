use std::path::PathBuf;

use super::filter::SubstituteFilter;
use super::pipeline::{ScoringOptions, SubstitutionPipeline};
use super::vocab::Vocabulary;
use crate::core::{Language, Result, RunConfig, RunLayout};
use crate::data::StopwordSet;
use crate::loaders::{BertModelLoader, TokenizerLoader};
use crate::models::implementations::bert::BertForMaskedLM;
use crate::pipelines::utils::DeviceRequest;

/// Builder for a substitution pipeline backed by a local BERT checkpoint.
pub struct SubstitutionPipelineBuilder {
    model_dir: PathBuf,
    base_model: Option<String>,
    strip_accents: Option<bool>,
    stopwords: StopwordSet,
    options: ScoringOptions,
    device_request: DeviceRequest,
}

impl SubstitutionPipelineBuilder {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            base_model: None,
            strip_accents: None,
            stopwords: StopwordSet::default(),
            options: ScoringOptions::default(),
            device_request: DeviceRequest::Default,
        }
    }

    /// Builder for the checkpoint and scoring options of a run.
    pub fn from_run_config(config: &RunConfig, layout: &RunLayout) -> Self {
        let mut builder = Self::new(&layout.model_dir).base_model(config.model.as_str());
        builder.options = ScoringOptions::from(config);
        builder.device_request = config.device.into();
        // only the German vocabulary is sensitive to accent handling
        if config.lang == Language::Ger {
            builder.strip_accents = Some(config.strip_accents);
        }
        builder
    }

    /// Hub id of the model the checkpoint was trained from; supplies the
    /// tokenizer when the checkpoint directory has none.
    pub fn base_model(mut self, repo: impl Into<String>) -> Self {
        self.base_model = Some(repo.into());
        self
    }

    pub fn strip_accents(mut self, strip: bool) -> Self {
        self.strip_accents = Some(strip);
        self
    }

    pub fn stopwords(mut self, stopwords: StopwordSet) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.options.batch_size = batch_size;
        self
    }

    pub fn max_window_size(mut self, max_window_size: usize) -> Self {
        self.options.max_window_size = max_window_size;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.options.top_k = top_k;
        self
    }

    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    pub fn cuda_device(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    pub fn device(mut self, device: candle_core::Device) -> Self {
        self.device_request = DeviceRequest::Explicit(device);
        self
    }

    pub fn device_request(mut self, request: DeviceRequest) -> Self {
        self.device_request = request;
        self
    }

    pub fn build(self) -> Result<SubstitutionPipeline<BertForMaskedLM>> {
        let device = self.device_request.resolve()?;

        let mut tokenizer_loader = TokenizerLoader::new(&self.model_dir);
        if let Some(repo) = &self.base_model {
            tokenizer_loader = tokenizer_loader.base_model(repo.as_str());
        }
        if let Some(strip) = self.strip_accents {
            tokenizer_loader = tokenizer_loader.strip_accents(strip);
        }
        let tokenizer = tokenizer_loader.load()?;
        let vocabulary = Vocabulary::from_tokenizer(&tokenizer)?;

        let (_config, encoder, head) = BertModelLoader::new(&self.model_dir).load(&device)?;
        let model = BertForMaskedLM::new(encoder, head);

        tracing::info!(device = ?device, vocab = vocabulary.len(), "Pipeline ready");
        Ok(SubstitutionPipeline::new(
            model,
            vocabulary,
            SubstituteFilter::new(self.stopwords),
            self.options,
        ))
    }
}
