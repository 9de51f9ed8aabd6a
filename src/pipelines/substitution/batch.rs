use candle_core::{Device, Tensor};

use super::vocab::Vocabulary;
use super::window::WindowedInstance;
use crate::core::Result;

/// Extra positions taken by the sequence-start and sequence-end markers.
pub const BOUNDARY_TOKENS: usize = 2;

/// Zero-padded input ids and attention mask for one batch.
///
/// The buffers hold `capacity` rows; only the first `rows` carry data.
#[derive(Debug)]
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub rows: usize,
    pub min_len: usize,
    pub max_len: usize,
    /// Mask index per row, shifted past the sequence-start marker.
    pub mask_positions: Vec<usize>,
}

impl EncodedBatch {
    pub fn encode(
        instances: &[WindowedInstance],
        vocabulary: &Vocabulary,
        capacity: usize,
        device: &Device,
    ) -> Result<Self> {
        let lengths = instances
            .iter()
            .map(|instance| instance.sequence().len() + BOUNDARY_TOKENS);
        let min_len = lengths.clone().min().unwrap_or(BOUNDARY_TOKENS);
        let max_len = lengths.max().unwrap_or(BOUNDARY_TOKENS);
        let capacity = capacity.max(instances.len());

        let mut input_ids = vec![0u32; capacity * max_len];
        let mut attention_mask = vec![0u32; capacity * max_len];
        let mut mask_positions = Vec::with_capacity(instances.len());

        for (row, instance) in instances.iter().enumerate() {
            let mut ids = Vec::with_capacity(instance.sequence().len() + BOUNDARY_TOKENS);
            ids.push(vocabulary.cls_id());
            ids.extend(vocabulary.convert_tokens_to_ids(instance.sequence()));
            ids.push(vocabulary.sep_id());

            let start = row * max_len;
            input_ids[start..start + ids.len()].copy_from_slice(&ids);
            attention_mask[start..start + ids.len()].fill(1);
            mask_positions.push(instance.mask_position() + 1);
        }

        Ok(Self {
            input_ids: Tensor::from_vec(input_ids, (capacity, max_len), device)?,
            attention_mask: Tensor::from_vec(attention_mask, (capacity, max_len), device)?,
            rows: instances.len(),
            min_len,
            max_len,
            mask_positions,
        })
    }
}
