pub mod bert;

pub use bert::{load_masked_lm, BertForMaskedLM, BertLMHead, BertModel};
