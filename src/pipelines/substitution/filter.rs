use super::vocab::Vocabulary;
use super::window::CONTINUATION_MARKER;
use crate::core::{Result, SubstituteError};
use crate::data::StopwordSet;

/// Decides which vocabulary entries may be reported as substitutes.
#[derive(Debug, Clone, Default)]
pub struct SubstituteFilter {
    stopwords: StopwordSet,
}

impl SubstituteFilter {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self { stopwords }
    }

    /// Rejects single characters, stopwords, word-piece continuations,
    /// ellipses and bracketed special tokens.
    pub fn accepts(&self, token: &str) -> bool {
        token.chars().count() > 1
            && !self.stopwords.contains(token)
            && !token.contains(CONTINUATION_MARKER)
            && !token.contains("...")
            && !token.contains('[')
    }
}

/// Exactly `k` accepted tokens in descending probability, with their
/// probabilities.
///
/// The whole ranked vocabulary is searched; running out of candidates is an
/// [`SubstituteError::InsufficientCandidates`] error.
pub fn select_top_k(
    probs: &[f32],
    vocabulary: &Vocabulary,
    filter: &SubstituteFilter,
    k: usize,
) -> Result<(Vec<String>, Vec<f32>)> {
    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));

    let mut terms = Vec::with_capacity(k);
    let mut term_probs = Vec::with_capacity(k);
    for index in order {
        if terms.len() == k {
            break;
        }
        let token = vocabulary.id_to_token(index);
        if filter.accepts(token) {
            terms.push(token.to_string());
            term_probs.push(probs[index]);
        }
    }

    if terms.len() < k {
        return Err(SubstituteError::InsufficientCandidates {
            found: terms.len(),
            wanted: k,
            vocab_size: probs.len(),
        });
    }
    Ok((terms, term_probs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> SubstituteFilter {
        SubstituteFilter::new(["the", "and"].into_iter().collect())
    }

    #[test]
    fn predicate_rules() {
        let filter = filter();
        assert!(filter.accepts("dog"));
        assert!(filter.accepts("öl"));
        assert!(!filter.accepts("a"));
        assert!(!filter.accepts("ö"));
        assert!(!filter.accepts("the"));
        assert!(!filter.accepts("##ing"));
        assert!(!filter.accepts("well..."));
        assert!(!filter.accepts("[MASK]"));
        assert!(!filter.accepts("[unused12]"));
    }

    #[test]
    fn picks_highest_valid_in_order() -> Result<()> {
        let vocab = Vocabulary::from_tokens([
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "the", "dog", "##s", "bird", "x",
        ])?;
        let probs = [0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 0.1, 0.15, 0.05, 0.2];
        let (terms, term_probs) = select_top_k(&probs, &vocab, &filter(), 2)?;
        assert_eq!(terms, ["dog", "bird"]);
        assert_eq!(term_probs, [0.1, 0.05]);
        Ok(())
    }

    #[test]
    fn exhausting_vocabulary_is_reported() -> Result<()> {
        let vocab = Vocabulary::from_tokens(["[UNK]", "[CLS]", "[SEP]", "[MASK]", "dog", "the"])?;
        let probs = [0.1, 0.1, 0.1, 0.1, 0.3, 0.3];
        match select_top_k(&probs, &vocab, &filter(), 2) {
            Err(SubstituteError::InsufficientCandidates {
                found,
                wanted,
                vocab_size,
            }) => assert_eq!((found, wanted, vocab_size), (1, 2, 6)),
            other => panic!("expected insufficient candidates, got {other:?}"),
        }
        Ok(())
    }
}
