//! Model label table and the raw-label → app-category remapping.

use std::collections::HashMap;

/// Ordered label names; `labels[i]` names `output[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.labels.get(i).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

/// Many-to-one translation from model labels to the app's categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    map: HashMap<String, String>,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::from_pairs([
            ("Food & Drink", "Food"),
            ("Groceries", "Bills"),
            ("Bills & Utilities", "Bills"),
            ("Services", "Other"),
            ("Travel", "Transport"),
        ])
    }
}

impl LabelMap {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            map: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Mapped name, or `raw` itself when there is no entry.
    pub fn map<'a>(&'a self, raw: &'a str) -> &'a str {
        self.map.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
