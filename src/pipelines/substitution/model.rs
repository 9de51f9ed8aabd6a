use candle_core::{Device, Result, Tensor};

/// A masked-language model split into its encoder and vocabulary head.
pub trait MaskedLanguageModel {
    /// Contextual embeddings, `(batch, seq_len)` ids and mask to
    /// `(batch, seq_len, hidden)`.
    fn encode(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor>;

    /// Vocabulary logits for `(n, hidden)` embeddings, shape `(n, vocab)`.
    fn project(&self, hidden_states: &Tensor) -> Result<Tensor>;

    fn device(&self) -> &Device;
}
