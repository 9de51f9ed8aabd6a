use std::collections::HashMap;

use tokenizers::Tokenizer;

use crate::core::{Result, SubstituteError};

pub const UNK_TOKEN: &str = "[UNK]";
pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const MASK_TOKEN: &str = "[MASK]";

/// Token <-> id lookup for a WordPiece vocabulary.
///
/// Ids without a token (gaps in the vocabulary) map to the empty string.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: HashMap<String, u32>,
    unk_id: u32,
    cls_id: u32,
    sep_id: u32,
}

impl Vocabulary {
    pub fn from_tokenizer(tokenizer: &Tokenizer) -> Result<Self> {
        Self::from_ids(tokenizer.get_vocab(true))
    }

    /// Build from tokens listed in id order, as in a `vocab.txt` file.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_ids(
            tokens
                .into_iter()
                .enumerate()
                .map(|(id, token)| (token.into(), id as u32))
                .collect(),
        )
    }

    pub fn from_ids(ids: HashMap<String, u32>) -> Result<Self> {
        let size = ids.values().max().map_or(0, |&max| max as usize + 1);
        let mut tokens = vec![String::new(); size];
        for (token, &id) in &ids {
            tokens[id as usize] = token.clone();
        }

        let special = |token: &str| {
            ids.get(token)
                .copied()
                .ok_or_else(|| SubstituteError::MissingSpecialToken(token.to_string()))
        };
        let unk_id = special(UNK_TOKEN)?;
        let cls_id = special(CLS_TOKEN)?;
        let sep_id = special(SEP_TOKEN)?;
        special(MASK_TOKEN)?;

        Ok(Self {
            tokens,
            ids,
            unk_id,
            cls_id,
            sep_id,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn mask_token(&self) -> &str {
        MASK_TOKEN
    }

    pub fn cls_id(&self) -> u32 {
        self.cls_id
    }

    pub fn sep_id(&self) -> u32 {
        self.sep_id
    }

    /// Unknown tokens map to `[UNK]`.
    pub fn token_to_id(&self, token: &str) -> u32 {
        self.ids.get(token).copied().unwrap_or(self.unk_id)
    }

    pub fn convert_tokens_to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens
            .iter()
            .map(|token| self.token_to_id(token.as_ref()))
            .collect()
    }

    pub fn id_to_token(&self, id: usize) -> &str {
        self.tokens.get(id).map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_specials_and_unknowns() -> Result<()> {
        let vocab = Vocabulary::from_tokens(["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "cat"])?;
        assert_eq!(vocab.cls_id(), 2);
        assert_eq!(vocab.sep_id(), 3);
        assert_eq!(vocab.convert_tokens_to_ids(&["cat", "dog"]), [5, 1]);
        assert_eq!(vocab.id_to_token(5), "cat");
        assert_eq!(vocab.id_to_token(99), "");
        Ok(())
    }

    #[test]
    fn missing_mask_token_is_an_error() {
        let result = Vocabulary::from_tokens(["[PAD]", "[UNK]", "[CLS]", "[SEP]"]);
        assert!(matches!(result, Err(SubstituteError::MissingSpecialToken(t)) if t == "[MASK]"));
    }
}
