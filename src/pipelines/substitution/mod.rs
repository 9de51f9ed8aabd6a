//! Batched masked-substitution inference.
//!
//! For every occurrence of a target term the term is replaced by `[MASK]`,
//! the surrounding context is cut to a fixed radius, and a masked-language
//! model ranks replacements for the masked slot. The `k` most probable
//! replacements that pass [`SubstituteFilter`] are kept.
//!
//! ## Main Types
//!
//! - [`OccurrenceSampler`] - Caps and samples occurrences per term
//! - [`ContextWindower`] - Turns an occurrence into a masked token window
//! - [`SubstitutionPipeline`] - Batches, scores and filters windows
//! - [`SubstitutionPipelineBuilder`] - Loads a BERT checkpoint into a pipeline
//! - [`SubstitutionRun`] - Iterates a target index and writes one file per term
//! - [`run_with`] / [`run_pretrained`] - Load a run's inputs, record its config, run
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use lexsub::data::{Corpus, TargetIndex};
//! use lexsub::pipelines::substitution::*;
//! use std::path::Path;
//!
//! # fn run() -> lexsub::core::Result<()> {
//! let pipeline = SubstitutionPipelineBuilder::new("models/bert/model")
//!     .cpu()
//!     .top_k(5)
//!     .build()?;
//!
//! let corpus = Corpus::load(Path::new("all.jsonlist"))?;
//! let index = TargetIndex::load(Path::new("target_indices_in_tokens.json"))?;
//! let sampler = OccurrenceSampler::new(4000, 42);
//!
//! let summary = SubstitutionRun::new(&pipeline, &corpus, sampler, "subs_masked").run(&index)?;
//! println!("wrote {} files", summary.written.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod builder;
pub mod filter;
pub mod model;
pub mod pipeline;
pub mod run;
pub mod sampler;
pub mod vocab;
pub mod window;

pub use batch::EncodedBatch;
pub use builder::SubstitutionPipelineBuilder;
pub use filter::{select_top_k, SubstituteFilter};
pub use model::MaskedLanguageModel;
pub use pipeline::{ScoringOptions, SubstitutionPipeline, TermDiagnostics, TermReport};
pub use run::{run_pretrained, run_with, RunSummary, SubstitutionRun, MIN_OCCURRENCES};
pub use sampler::OccurrenceSampler;
pub use vocab::Vocabulary;
pub use window::{split_word_pieces, ContextWindower, WindowedInstance};
