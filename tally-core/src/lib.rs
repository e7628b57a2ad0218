//! tally-core: shared types and text utilities for expense category suggestion

pub mod category;
pub mod text;
pub mod time;

pub use category::{Category, Prediction, OTHER_LABEL, UNCATEGORIZED_LABEL};
pub use text::{memory_key, token_words, unigrams_and_bigrams};
pub use time::{millis_to_rfc3339, now_millis};
