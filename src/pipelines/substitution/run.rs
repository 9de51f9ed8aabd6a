use std::path::{Path, PathBuf};

use super::builder::SubstitutionPipelineBuilder;
use super::model::MaskedLanguageModel;
use super::pipeline::SubstitutionPipeline;
use super::sampler::OccurrenceSampler;
use crate::core::{Result, RunConfig, RunLayout};
use crate::data::{write_run_config, write_term_file, Corpus, StopwordSet, TargetIndex};

/// Terms with fewer sampled occurrences than this produce no output.
pub const MIN_OCCURRENCES: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Drives the pipeline over every term of an index, one term at a time.
pub struct SubstitutionRun<'a, M: MaskedLanguageModel> {
    pipeline: &'a SubstitutionPipeline<M>,
    corpus: &'a Corpus,
    sampler: OccurrenceSampler,
    output_dir: PathBuf,
}

impl<'a, M: MaskedLanguageModel> SubstitutionRun<'a, M> {
    pub fn new(
        pipeline: &'a SubstitutionPipeline<M>,
        corpus: &'a Corpus,
        sampler: OccurrenceSampler,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            corpus,
            sampler,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process terms in sorted order. Any error aborts the run; files of
    /// terms already finished stay on disk.
    pub fn run(&mut self, index: &TargetIndex) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (term, occurrences) in index.iter() {
            tracing::info!(term, occurrences = occurrences.len(), "Processing term");

            let sampled = self.sampler.sample(occurrences);
            if sampled.len() < MIN_OCCURRENCES {
                tracing::info!(
                term,
                examples = sampled.len(),
                "Skipping term with too few examples"
            );
                summary.skipped.push(term.to_string());
                continue;
            }

            let report = self.pipeline.run_term(term, &sampled, self.corpus)?;
            let path = write_term_file(&self.output_dir, term, &report.predictions)?;

            tracing::info!(
                term,
                records = report.predictions.len(),
                batches = report.batches,
                path = %path.display(),
                "Saved substitutes"
            );
            let diagnostics = &report.diagnostics;
            tracing::info!(term, targets = ?diagnostics.most_common_targets(100), "Target forms");
            tracing::info!(
                term,
                substitutes = ?diagnostics.most_common_substitutes(10),
                "Top substitutes"
            );

            summary.written.push(path);
        }

        Ok(summary)
    }
}

/// Load every input of `config`, build the pipeline with `build`, record the
/// run configuration and score every term.
///
/// Nothing is written before the inputs and the model have loaded, so a
/// missing or malformed input leaves the output directory untouched.
pub fn run_with<M, F>(config: &RunConfig, build: F) -> Result<RunSummary>
where
    M: MaskedLanguageModel,
    F: FnOnce(&RunLayout, StopwordSet) -> Result<SubstitutionPipeline<M>>,
{
    let layout = config.layout();

    let stopwords = match &config.stopwords {
        Some(path) => StopwordSet::load(path, config.lang)?,
        None => StopwordSet::load_or_builtin(&layout.stopwords_file, config.lang)?,
    };
    let corpus = Corpus::load(&layout.corpus_file)?;
    let index = TargetIndex::load(&layout.index_file)?;

    tracing::info!(model_dir = %layout.model_dir.display(), "Loading model");
    let pipeline = build(&layout, stopwords)?;

    let config_file = write_run_config(&layout, config)?;
    tracing::info!(path = %config_file.display(), "Wrote run configuration");

    let sampler = OccurrenceSampler::new(config.max_samples, config.seed);
    SubstitutionRun::new(&pipeline, &corpus, sampler, &layout.output_dir).run(&index)
}

/// [`run_with`] backed by the BERT checkpoint in the run's model directory.
pub fn run_pretrained(config: &RunConfig) -> Result<RunSummary> {
    run_with(config, |layout, stopwords| {
        SubstitutionPipelineBuilder::from_run_config(config, layout)
            .stopwords(stopwords)
            .build()
    })
}
