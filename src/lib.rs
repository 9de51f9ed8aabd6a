pub mod core;
pub mod data;
pub mod loaders;
pub mod models;
pub mod pipelines;

// Re-export core types
pub use self::core::{Language, Result, RunConfig, RunLayout, SubstituteError};

// Re-export model types for easier access
pub use models::implementations::{BertForMaskedLM, BertLMHead, BertModel};

pub use pipelines::substitution::{
    OccurrenceSampler, SubstitutionPipeline, SubstitutionPipelineBuilder, SubstitutionRun,
};
