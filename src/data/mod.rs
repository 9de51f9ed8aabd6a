//! Inputs produced by upstream corpus stages and the files this crate writes.

pub mod corpus;
pub mod index;
pub mod stopwords;
pub mod writer;

pub use corpus::{Corpus, Document, DocumentId};
pub use index::{Occurrence, TargetIndex};
pub use stopwords::StopwordSet;
pub use writer::{write_run_config, write_term_file, SubstitutePrediction};
