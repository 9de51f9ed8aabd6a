//! BERT encoder and masked-language-modeling head.
//!
//! The encoder and the head are loaded as two separate, statically typed
//! handles so that contextual embeddings can be taken at a chosen position
//! and only those rows pushed through the vocabulary projection.
//!
//! Checkpoints saved from a masked-LM model keep the encoder under a `bert.`
//! prefix and the head under `cls.predictions.`; bare encoder checkpoints
//! have no prefix. Both layouts are accepted.
//!
//! # Quick Start
//! ```rust,no_run
//! use candle_core::{DType, Device, Tensor};
//! use candle_nn::VarBuilder;
//! use lexsub::models::implementations::bert::{load_masked_lm, Config};
//!
//! # fn run(config: &Config, weights: std::path::PathBuf) -> candle_core::Result<()> {
//! let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &Device::Cpu)? };
//! let (encoder, head) = load_masked_lm(vb, config)?;
//! let input_ids = Tensor::new(&[[101u32, 103, 102]], &Device::Cpu)?;
//! let mask = Tensor::new(&[[1u32, 1, 1]], &Device::Cpu)?;
//! let hidden = encoder.forward(&input_ids, &mask)?;
//! let logits = head.forward(&hidden)?;
//! # Ok(())
//! # }
//! ```

use candle_core::{DType, Device, Result, Tensor, D};
use candle_nn::{
    embedding, layer_norm, linear, ops::softmax, Embedding, LayerNorm, Linear, VarBuilder,
};
use serde::Deserialize;

use crate::pipelines::substitution::MaskedLanguageModel;

const MIN_VALUE_F64: f64 = f32::MIN as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum HiddenAct {
    #[default]
    #[serde(rename = "gelu")]
    Gelu,
    #[serde(rename = "gelu_new", alias = "gelu_pytorch_tanh")]
    GeluApproximate,
    #[serde(rename = "relu")]
    Relu,
}

impl HiddenAct {
    fn apply(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            HiddenAct::Gelu => xs.gelu_erf(),
            HiddenAct::GeluApproximate => xs.gelu(),
            HiddenAct::Relu => xs.relu(),
        }
    }
}

fn default_type_vocab_size() -> usize {
    2
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

/// The subset of a Hugging Face `config.json` needed for inference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    #[serde(default)]
    pub hidden_act: HiddenAct,
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
}

/// Word, position and token-type embeddings followed by layer norm.
#[derive(Debug, Clone)]
struct Embeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    token_type_embeddings: Embedding,
    norm: LayerNorm,
}

impl Embeddings {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let word_embeddings = embedding(
            config.vocab_size,
            config.hidden_size,
            vb.pp("word_embeddings"),
        )?;
        let position_embeddings = embedding(
            config.max_position_embeddings,
            config.hidden_size,
            vb.pp("position_embeddings"),
        )?;
        let token_type_embeddings = embedding(
            config.type_vocab_size,
            config.hidden_size,
            vb.pp("token_type_embeddings"),
        )?;
        let norm = layer_norm(config.hidden_size, config.layer_norm_eps, vb.pp("LayerNorm"))?;

        Ok(Self {
            word_embeddings,
            position_embeddings,
            token_type_embeddings,
            norm,
        })
    }

    fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let seq_len = input_ids.dim(1)?;
        let position_ids = Tensor::arange(0u32, seq_len as u32, input_ids.device())?.unsqueeze(0)?;
        // single-segment inputs only
        let token_type_ids = input_ids.zeros_like()?;

        let words = input_ids.apply(&self.word_embeddings)?;
        let positions = position_ids.apply(&self.position_embeddings)?;
        let token_types = token_type_ids.apply(&self.token_type_embeddings)?;

        words
            .broadcast_add(&positions)?
            .add(&token_types)?
            .apply(&self.norm)
    }
}

/// Multi-head self attention with its residual output projection.
#[derive(Debug, Clone)]
struct Attention {
    query: Linear,
    key: Linear,
    value: Linear,
    output: Linear,
    output_norm: LayerNorm,
    num_attention_heads: usize,
    attention_head_size: usize,
}

impl Attention {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let hidden = config.hidden_size;
        let self_vb = vb.pp("self");
        let output_vb = vb.pp("output");

        Ok(Self {
            query: linear(hidden, hidden, self_vb.pp("query"))?,
            key: linear(hidden, hidden, self_vb.pp("key"))?,
            value: linear(hidden, hidden, self_vb.pp("value"))?,
            output: linear(hidden, hidden, output_vb.pp("dense"))?,
            output_norm: layer_norm(hidden, config.layer_norm_eps, output_vb.pp("LayerNorm"))?,
            num_attention_heads: config.num_attention_heads,
            attention_head_size: hidden / config.num_attention_heads,
        })
    }

    fn split_heads(&self, xs: Tensor, batch: usize, seq_len: usize) -> Result<Tensor> {
        xs.reshape((batch, seq_len, self.num_attention_heads, self.attention_head_size))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, hidden_size) = hidden_states.dims3()?;

        let q = self.split_heads(hidden_states.apply(&self.query)?, batch, seq_len)?;
        let k = self.split_heads(hidden_states.apply(&self.key)?, batch, seq_len)?;
        let v = self.split_heads(hidden_states.apply(&self.value)?, batch, seq_len)?;

        let scale = (self.attention_head_size as f64).powf(-0.5);
        let q = (q * scale)?;

        let attention_scores = q.matmul(&k.transpose(D::Minus2, D::Minus1)?)?;
        let attention_scores = attention_scores.broadcast_add(attention_mask)?;
        let attention_probs = softmax(&attention_scores, D::Minus1)?;

        let context = attention_probs
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((batch, seq_len, hidden_size))?;

        (context.apply(&self.output)? + hidden_states)?.apply(&self.output_norm)
    }
}

#[derive(Debug, Clone)]
struct TransformerLayer {
    attention: Attention,
    intermediate: Linear,
    output: Linear,
    output_norm: LayerNorm,
    activation: HiddenAct,
}

impl TransformerLayer {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let attention = Attention::load(vb.pp("attention"), config)?;
        let intermediate = linear(
            config.hidden_size,
            config.intermediate_size,
            vb.pp("intermediate.dense"),
        )?;
        let output = linear(
            config.intermediate_size,
            config.hidden_size,
            vb.pp("output.dense"),
        )?;
        let output_norm = layer_norm(
            config.hidden_size,
            config.layer_norm_eps,
            vb.pp("output.LayerNorm"),
        )?;

        Ok(Self {
            attention,
            intermediate,
            output,
            output_norm,
            activation: config.hidden_act,
        })
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let attention_output = self.attention.forward(hidden_states, attention_mask)?;
        let intermediate = self
            .activation
            .apply(&attention_output.apply(&self.intermediate)?)?;
        (intermediate.apply(&self.output)? + attention_output)?.apply(&self.output_norm)
    }
}

/// The BERT encoder stack producing contextual embeddings.
#[derive(Debug, Clone)]
pub struct BertModel {
    embeddings: Embeddings,
    layers: Vec<TransformerLayer>,
    device: Device,
    dtype: DType,
}

impl BertModel {
    /// Load an encoder from weights rooted at `embeddings.*` / `encoder.*`.
    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let embeddings = Embeddings::load(vb.pp("embeddings"), config)?;

        let mut layers = Vec::with_capacity(config.num_hidden_layers);
        for layer_idx in 0..config.num_hidden_layers {
            layers.push(TransformerLayer::load(
                vb.pp(format!("encoder.layer.{layer_idx}")),
                config,
            )?);
        }

        Ok(Self {
            embeddings,
            layers,
            device: vb.device().clone(),
            dtype: vb.dtype(),
        })
    }

    /// Additive attention bias: 0 for attended positions, a large negative
    /// value for padding.
    fn create_attention_bias(&self, mask: &Tensor) -> Result<Tensor> {
        let (batch_size, seq_len) = mask.dims2()?;

        let expanded_mask = mask
            .unsqueeze(1)?
            .unsqueeze(2)?
            .expand((batch_size, 1, seq_len, seq_len))?
            .to_dtype(self.dtype)?;

        let inverted_mask = (1.0 - expanded_mask)?;
        (inverted_mask * MIN_VALUE_F64)?.to_dtype(self.dtype)
    }

    /// Forward pass returning hidden states.
    ///
    /// # Arguments
    /// * `input_ids` - Token IDs with shape `(batch_size, sequence_length)`
    /// * `attention_mask` - `(batch_size, sequence_length)`, 1 for real tokens and 0 for padding
    ///
    /// # Returns
    /// Hidden states with shape `(batch_size, sequence_length, hidden_size)`
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let attention_bias = self.create_attention_bias(attention_mask)?;
        let mut hidden_states = self.embeddings.forward(input_ids)?;
        for layer in &self.layers {
            hidden_states = layer.forward(&hidden_states, &attention_bias)?;
        }
        Ok(hidden_states)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    fn word_embeddings(&self) -> &Tensor {
        self.embeddings.word_embeddings.embeddings()
    }
}

/// Transform + vocabulary decoder (`cls.predictions`).
#[derive(Debug, Clone)]
pub struct BertLMHead {
    dense: Linear,
    norm: LayerNorm,
    decoder: Linear,
    activation: HiddenAct,
}

impl BertLMHead {
    /// Load the head from weights rooted at `transform.*`. The decoder falls
    /// back to `tied_embeddings` when the checkpoint omits its own matrix.
    pub fn load(vb: VarBuilder, config: &Config, tied_embeddings: &Tensor) -> Result<Self> {
        let dense = linear(config.hidden_size, config.hidden_size, vb.pp("transform.dense"))?;
        let norm = layer_norm(
            config.hidden_size,
            config.layer_norm_eps,
            vb.pp("transform.LayerNorm"),
        )?;

        let decoder_weights = if vb.contains_tensor("decoder.weight") {
            vb.get((config.vocab_size, config.hidden_size), "decoder.weight")?
        } else {
            tied_embeddings.clone()
        };
        let decoder_bias = if vb.contains_tensor("bias") {
            vb.get(config.vocab_size, "bias")?
        } else {
            vb.get(config.vocab_size, "decoder.bias")?
        };
        let decoder = Linear::new(decoder_weights, Some(decoder_bias));

        Ok(Self {
            dense,
            norm,
            decoder,
            activation: config.hidden_act,
        })
    }

    /// Project hidden states of any leading shape to vocabulary logits.
    pub fn forward(&self, hidden_states: &Tensor) -> Result<Tensor> {
        let transformed = self.activation.apply(&hidden_states.apply(&self.dense)?)?;
        transformed.apply(&self.norm)?.apply(&self.decoder)
    }
}

/// Load the encoder and masked-LM head from one checkpoint.
pub fn load_masked_lm(vb: VarBuilder, config: &Config) -> Result<(BertModel, BertLMHead)> {
    let encoder_vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        vb.pp("bert")
    } else {
        vb.clone()
    };
    let encoder = BertModel::load(encoder_vb, config)?;
    let head = BertLMHead::load(vb.pp("cls.predictions"), config, encoder.word_embeddings())?;
    Ok((encoder, head))
}

/// Encoder and head paired for masked substitution.
#[derive(Debug, Clone)]
pub struct BertForMaskedLM {
    encoder: BertModel,
    head: BertLMHead,
}

impl BertForMaskedLM {
    pub fn new(encoder: BertModel, head: BertLMHead) -> Self {
        Self { encoder, head }
    }

    pub fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let (encoder, head) = load_masked_lm(vb, config)?;
        Ok(Self::new(encoder, head))
    }
}

impl MaskedLanguageModel for BertForMaskedLM {
    fn encode(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        self.encoder.forward(input_ids, attention_mask)
    }

    fn project(&self, hidden_states: &Tensor) -> Result<Tensor> {
        self.head.forward(hidden_states)
    }

    fn device(&self) -> &Device {
        self.encoder.device()
    }
}
