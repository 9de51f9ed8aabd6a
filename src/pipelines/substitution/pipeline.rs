use std::collections::HashMap;

use candle_core::{DType, IndexOp, Tensor, D};
use candle_nn::ops::softmax;

use super::batch::EncodedBatch;
use super::filter::{select_top_k, SubstituteFilter};
use super::model::MaskedLanguageModel;
use super::vocab::Vocabulary;
use super::window::{surface_form, ContextWindower, WindowedInstance};
use crate::core::{Result, RunConfig, SubstituteError};
use crate::data::{Corpus, Occurrence, SubstitutePrediction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringOptions {
    pub batch_size: usize,
    pub max_window_size: usize,
    pub top_k: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            batch_size: 4000,
            max_window_size: 50,
            top_k: 11,
        }
    }
}

impl From<&RunConfig> for ScoringOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            max_window_size: config.max_window_size,
            top_k: config.top_k,
        }
    }
}

/// Occurrence counts kept for progress reporting only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermDiagnostics {
    pub target_forms: HashMap<String, usize>,
    pub substitutes: HashMap<String, usize>,
}

impl TermDiagnostics {
    pub fn most_common_targets(&self, n: usize) -> Vec<(&str, usize)> {
        most_common(&self.target_forms, n)
    }

    pub fn most_common_substitutes(&self, n: usize) -> Vec<(&str, usize)> {
        most_common(&self.substitutes, n)
    }
}

fn most_common(counts: &HashMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(n);
    entries
}

/// Predictions for every scored occurrence of one term, in input order.
#[derive(Debug, Clone, Default)]
pub struct TermReport {
    pub predictions: Vec<SubstitutePrediction>,
    pub diagnostics: TermDiagnostics,
    pub batches: usize,
}

/// Masks target occurrences, scores them in batches and keeps the top-k
/// valid substitutes of each.
pub struct SubstitutionPipeline<M: MaskedLanguageModel> {
    pub(crate) model: M,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) windower: ContextWindower,
    pub(crate) filter: SubstituteFilter,
    pub(crate) options: ScoringOptions,
}

impl<M: MaskedLanguageModel> SubstitutionPipeline<M> {
    pub fn new(
        model: M,
        vocabulary: Vocabulary,
        filter: SubstituteFilter,
        options: ScoringOptions,
    ) -> Self {
        let windower = ContextWindower::new(options.max_window_size, vocabulary.mask_token());
        Self {
            model,
            vocabulary,
            windower,
            filter,
            options,
        }
    }

    pub fn options(&self) -> &ScoringOptions {
        &self.options
    }

    pub fn windower(&self) -> &ContextWindower {
        &self.windower
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }

    /// Score one batch of windowed instances.
    pub fn score_batch(&self, instances: &[WindowedInstance]) -> Result<Vec<SubstitutePrediction>> {
        if instances.is_empty() {
            return Ok(Vec::new());
        }
        let batch = self.encode(instances)?;
        self.score_encoded(instances, &batch)
    }

    fn encode(&self, instances: &[WindowedInstance]) -> Result<EncodedBatch> {
        EncodedBatch::encode(
            instances,
            &self.vocabulary,
            self.options.batch_size,
            self.model.device(),
        )
    }

    fn score_encoded(
        &self,
        instances: &[WindowedInstance],
        batch: &EncodedBatch,
    ) -> Result<Vec<SubstitutePrediction>> {
        let probs = self.mask_probabilities(batch).map_err(|source| {
            tracing::error!(
                batch_len = instances.len(),
                error = %source,
                "Model forward pass failed"
            );
            SubstituteError::Inference {
                batch_len: instances.len(),
                source,
            }
        })?;

        instances
            .iter()
            .zip(probs)
            .map(|(instance, row)| {
                let (top_terms, top_term_probs) =
                    select_top_k(&row, &self.vocabulary, &self.filter, self.options.top_k)?;
                Ok(SubstitutePrediction {
                    line_id: instance.document.clone(),
                    token_index: instance.token_index,
                    top_terms,
                    top_term_probs,
                })
            })
            .collect()
    }

    /// Softmax over the vocabulary at each row's mask position.
    fn mask_probabilities(&self, batch: &EncodedBatch) -> candle_core::Result<Vec<Vec<f32>>> {
        let hidden = self.model.encode(&batch.input_ids, &batch.attention_mask)?;

        let mask_vectors = batch
            .mask_positions
            .iter()
            .enumerate()
            .map(|(row, &position)| hidden.i((row, position)))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let mask_vectors = Tensor::stack(&mask_vectors, 0)?;

        let logits = self.model.project(&mask_vectors)?;
        softmax(&logits, D::Minus1)?
            .to_dtype(DType::F32)?
            .to_vec2::<f32>()
    }

    /// Window, batch and score every occurrence of a term.
    ///
    /// A batch is flushed when it is full or the occurrences run out; the
    /// final batch is scored whatever its size.
    pub fn run_term(
        &self,
        term: &str,
        occurrences: &[Occurrence],
        corpus: &Corpus,
    ) -> Result<TermReport> {
        let mut report = TermReport {
            predictions: Vec::with_capacity(occurrences.len()),
            ..Default::default()
        };
        let batch_size = self.options.batch_size.max(1);
        let mut pending: Vec<WindowedInstance> =
            Vec::with_capacity(batch_size.min(occurrences.len()));

        for (sample_index, occurrence) in occurrences.iter().enumerate() {
            let document = corpus.get(&occurrence.document)?;
            let instance = self.windower.window(document, occurrence)?;
            *report
                .diagnostics
                .target_forms
                .entry(surface_form(&instance.target))
                .or_default() += 1;
            pending.push(instance);

            let is_last = sample_index + 1 == occurrences.len();
            if pending.len() == batch_size || is_last {
                let encoded = self.encode(&pending)?;
                let predictions = self.score_encoded(&pending, &encoded)?;
                for prediction in &predictions {
                    for substitute in &prediction.top_terms {
                        *report
                            .diagnostics
                            .substitutes
                            .entry(substitute.clone())
                            .or_default() += 1;
                    }
                }
                report.predictions.extend(predictions);

                tracing::info!(
                    term,
                    sample_index,
                    batch = report.batches,
                    rows = encoded.rows,
                    min_len = encoded.min_len,
                    max_len = encoded.max_len,
                    done = report.predictions.len(),
                    total = occurrences.len(),
                    "Scored batch"
                );

                report.batches += 1;
                pending.clear();
            }
        }

        Ok(report)
    }
}
