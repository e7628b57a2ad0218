//! Text normalization shared by the tokenizer and the correction log.
//!
//! Two different normalizations are in play:
//! - `token_words`: lowercase, keep only `[a-z0-9 ]`, split on spaces (model input)
//! - `memory_key`: lowercase + trim only (correction log key)

use regex::Regex;
use std::sync::LazyLock;

static NON_TOKEN_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9 ]").expect("static pattern"));

/// Lowercase `text`, strip everything outside `[a-z0-9 ]`, and split into words.
///
/// Only the ASCII space survives as a separator: tabs and newlines are stripped
/// like any other punctuation, so "a\tb" becomes the single word "ab".
pub fn token_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_TOKEN_CHARS.replace_all(&lowered, "");
    cleaned
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Unigrams followed by the bigram starting at the same word, left to right.
///
/// `["uber", "to", "airport"]` → `uber`, `uber to`, `to`, `to airport`, `airport`.
pub fn unigrams_and_bigrams(words: &[String]) -> Vec<String> {
    let mut tokens = Vec::with_capacity(words.len() * 2);
    for (i, w) in words.iter().enumerate() {
        tokens.push(w.clone());
        if let Some(next) = words.get(i + 1) {
            tokens.push(format!("{w} {next}"));
        }
    }
    tokens
}

/// Key used for storing and looking up corrections.
pub fn memory_key(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}
