//! Vocabulary table and token resolution.
//!
//! Resolution goes from cheap and exact to expensive and fuzzy:
//! 1) alias table (domain synonyms)
//! 2) exact lookup
//! 3) suffix stripping: -ies → -y, -es, -s
//! 4) edit distance ≤ 1 against words of similar length

use std::collections::HashMap;

/// Reserved for padding; never produced by resolution of a real token.
pub const PAD_INDEX: usize = 0;
/// Position used for tokens that resolve to nothing.
pub const UNK_INDEX: usize = 1;

/// Domain synonyms applied before any lookup.
const TOKEN_ALIASES: &[(&str, &str)] = &[
    ("phone", "mobile"),
    ("phones", "mobile"),
    ("cellphone", "mobile"),
    ("cell", "mobile"),
];

/// Ordered token table. Position in `words` is the feature index.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from the ordered word list. A duplicated word maps to its last position.
    pub fn new(words: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(words.len());
        for (i, w) in words.iter().enumerate() {
            index.insert(w.clone(), i);
        }
        Self { words, index }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Exact lookup only.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Map a unigram or bigram to its feature index, tolerating plurals and one typo.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        let token = alias(token);
        if let Some(idx) = self.get(token) {
            return Some(idx);
        }
        self.resolve_by_suffix(token)
            .or_else(|| self.resolve_fuzzy(token))
    }

    fn resolve_by_suffix(&self, token: &str) -> Option<usize> {
        let len = token.chars().count();

        if len > 3 {
            if let Some(stem) = token.strip_suffix("ies") {
                if let Some(idx) = self.get(&format!("{stem}y")) {
                    return Some(idx);
                }
            }
            if let Some(stem) = token.strip_suffix("es") {
                if let Some(idx) = self.get(stem) {
                    return Some(idx);
                }
            }
        }

        if len > 2 {
            if let Some(stem) = token.strip_suffix('s') {
                if let Some(idx) = self.get(stem) {
                    return Some(idx);
                }
            }
        }

        None
    }

    /// Scans in stored order; the first word within distance 1 wins, not the
    /// globally closest one.
    fn resolve_fuzzy(&self, token: &str) -> Option<usize> {
        let len = token.chars().count();
        if len <= 3 {
            return None;
        }

        let mut best: Option<usize> = None;
        let mut best_distance = 2;
        for word in &self.words {
            if word.chars().count().abs_diff(len) > 2 {
                continue;
            }
            let distance = levenshtein(token, word);
            if distance < best_distance {
                best_distance = distance;
                best = self.get(word);
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }
}

fn alias(token: &str) -> &str {
    TOKEN_ALIASES
        .iter()
        .find(|(from, _)| *from == token)
        .map(|(_, to)| *to)
        .unwrap_or(token)
}

/// Classic insert/delete/substitute edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
