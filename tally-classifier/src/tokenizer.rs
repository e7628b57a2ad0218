//! Expense name → multi-hot feature buffer.
//!
//! Every unigram and adjacent bigram is resolved against the vocabulary; the
//! matching positions are set to 1. Repeats do not count twice.

use crate::buffer::{InputBuffer, InputSpec};
use crate::vocab::{Vocabulary, UNK_INDEX};
use std::sync::Arc;
use tally_core::{token_words, unigrams_and_bigrams};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenizedInput {
    pub buffer: InputBuffer,
    /// Words after normalization
    pub words: usize,
    /// Unigrams + bigrams
    pub tokens: usize,
    /// Tokens that fell back to the unknown index
    pub unknown: usize,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: Arc<Vocabulary>,
}

impl Tokenizer {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Encode `text` into a buffer shaped and typed per `spec`.
    ///
    /// Text with no usable words yields an all-zero buffer of the full width.
    pub fn tokenize(&self, text: &str, spec: &InputSpec) -> TokenizedInput {
        let words = token_words(text);
        let tokens = unigrams_and_bigrams(&words);

        let width = spec.buffer_len(self.vocab.len());
        let mut buffer = InputBuffer::zeros(spec.kind, width);

        let mut unknown = 0usize;
        for token in &tokens {
            let idx = self.vocab.resolve(token).unwrap_or(UNK_INDEX);
            if idx == UNK_INDEX {
                unknown += 1;
            }
            // Indices past the model width are dropped.
            buffer.set_one(idx);
        }

        if !words.is_empty() {
            debug!(
                total = tokens.len(),
                unknown,
                sample = ?words.iter().take(6).collect::<Vec<_>>(),
                input_type = buffer.kind().name(),
                non_zero = buffer.count_nonzero(),
                width,
                "token stats"
            );
        }

        TokenizedInput {
            buffer,
            words: words.len(),
            tokens: tokens.len(),
            unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ElementKind;
    use crate::vocab::PAD_INDEX;

    fn tokenizer() -> Tokenizer {
        let words = [
            "", "[UNK]", "uber", "to", "airport", "phone", "bill", "mobile", "mobile bill",
        ];
        let words = words.iter().map(|s| s.to_string()).collect();
        Tokenizer::new(Arc::new(Vocabulary::new(words)))
    }

    #[test]
    fn test_multi_hot_unigrams_and_bigrams() {
        let t = tokenizer();
        let out = t.tokenize("Phone bill", &InputSpec::default());
        // "phone" aliases to "mobile", "phone bill" is unknown, "bill" is exact
        assert_eq!(out.tokens, 3);
        assert_eq!(out.unknown, 1);
        assert_eq!(out.buffer.len(), 9);
        assert_eq!(out.buffer.to_f32_vec(), vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_bigram_in_vocabulary_is_set() {
        let t = tokenizer();
        let out = t.tokenize("mobile bill", &InputSpec::default());
        assert_eq!(out.unknown, 0);
        assert_eq!(out.buffer.value(8), 1.0);
    }

    #[test]
    fn test_repeats_do_not_count() {
        let t = tokenizer();
        let out = t.tokenize("uber uber uber", &InputSpec::new(vec![1, 9], ElementKind::Int32));
        assert_eq!(out.buffer.value(2), 1.0);
        // "uber uber" is unknown twice
        assert_eq!(out.unknown, 2);
        assert_eq!(out.buffer.count_nonzero(), 2);
    }

    #[test]
    fn test_empty_text_is_all_zero_full_width() {
        let t = tokenizer();
        for text in ["", "   ", "!!!", "—…"] {
            let out = t.tokenize(text, &InputSpec::new(vec![1, 16], ElementKind::Uint8));
            assert_eq!(out.buffer.len(), 16);
            assert_eq!(out.buffer.count_nonzero(), 0);
            assert_eq!(out.tokens, 0);
        }
    }

    #[test]
    fn test_out_of_range_indices_dropped() {
        let t = tokenizer();
        let out = t.tokenize("airport", &InputSpec::new(vec![1, 3], ElementKind::Float32));
        assert_eq!(out.buffer.len(), 3);
        assert_eq!(out.buffer.count_nonzero(), 0);
    }

    #[test]
    fn test_padding_never_set() {
        let t = tokenizer();
        let out = t.tokenize("uber to airport xyz", &InputSpec::default());
        assert_eq!(out.buffer.value(PAD_INDEX), 0.0);
        assert_eq!(out.buffer.kind(), ElementKind::Float32);
    }
}
