//! Fixed-radius context windows around a masked occurrence.

use crate::core::{Result, SubstituteError};
use crate::data::{Document, DocumentId, Occurrence};

/// Continuation prefix used by WordPiece vocabularies.
pub const CONTINUATION_MARKER: &str = "##";

/// Split every `##` continuation into its own element.
///
/// `["un##believ##able", "story"]` becomes
/// `["un", "##believ", "##able", "story"]`. Whitespace inside a token also
/// separates elements and empty tokens disappear.
pub fn split_word_pieces<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .flat_map(|token| {
            token
                .as_ref()
                .replace(CONTINUATION_MARKER, " ##")
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Surface form of a target token with continuation markers removed.
pub fn surface_form(token: &str) -> String {
    token.replace(CONTINUATION_MARKER, "")
}

/// One occurrence ready for encoding: left context, mask, right context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedInstance {
    pub document: DocumentId,
    pub token_index: usize,
    /// The original token at `token_index`.
    pub target: String,
    sequence: Vec<String>,
    mask_position: usize,
}

impl WindowedInstance {
    /// Left tokens, the mask placeholder and right tokens.
    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    /// Index of the mask in [`sequence`](Self::sequence), before any
    /// sequence-start marker is prepended.
    pub fn mask_position(&self) -> usize {
        self.mask_position
    }

    pub fn left(&self) -> &[String] {
        &self.sequence[..self.mask_position]
    }

    pub fn right(&self) -> &[String] {
        &self.sequence[self.mask_position + 1..]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindower {
    max_window_size: usize,
    mask_token: String,
}

impl ContextWindower {
    pub fn new(max_window_size: usize, mask_token: impl Into<String>) -> Self {
        Self {
            max_window_size,
            mask_token: mask_token.into(),
        }
    }

    pub fn max_window_size(&self) -> usize {
        self.max_window_size
    }

    pub fn window(&self, document: &Document, occurrence: &Occurrence) -> Result<WindowedInstance> {
        let tokens = &document.tokens;
        let index = occurrence.token_index;
        if index >= tokens.len() {
            return Err(SubstituteError::TokenIndexOutOfRange {
                document: document.id.to_string(),
                index,
                len: tokens.len(),
            });
        }

        let left = split_word_pieces(&tokens[..index]);
        let right = split_word_pieces(&tokens[index + 1..]);

        let left = &left[left.len().saturating_sub(self.max_window_size)..];
        let right = &right[..right.len().min(self.max_window_size)];

        let mut sequence = Vec::with_capacity(left.len() + 1 + right.len());
        sequence.extend_from_slice(left);
        sequence.push(self.mask_token.clone());
        sequence.extend_from_slice(right);

        Ok(WindowedInstance {
            document: occurrence.document.clone(),
            token_index: index,
            target: tokens[index].clone(),
            mask_position: left.len(),
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_continuations_into_elements() {
        let pieces = split_word_pieces(&["un##believ##able", "story", "##s", ""]);
        assert_eq!(pieces, ["un", "##believ", "##able", "story", "##s"]);
    }

    #[test]
    fn surface_form_strips_markers() {
        assert_eq!(surface_form("##cat##s"), "cats");
    }
}
