//! Correction memory: the user's explicit category choices, replayed before the model runs.
//!
//! Lookup order:
//! 1) exact match on the normalized text
//! 2) substring match in either direction
//!
//! Within each pass the most recent record wins. Persistence is best-effort:
//! failures are logged and never surface to the caller.
//!
//! Reads and writes are an unlocked read-modify-write of the whole log. Two
//! concurrent writers can lose one update (last write wins).

use crate::error::StoreError;
use crate::record::CorrectionRecord;
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use tally_core::{memory_key, now_millis};
use tracing::{debug, error};

/// Fixed key the log is stored under.
pub const CORRECTIONS_KEY: &str = "category_corrections";

/// Number of corrections kept; older ones are evicted first.
pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub capacity: usize,
    /// Stored texts shorter than this never take part in substring matching.
    /// 0 keeps every record eligible.
    pub min_partial_len: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            min_partial_len: 0,
        }
    }
}

pub struct CorrectionMemory<S> {
    store: S,
    config: LearningConfig,
}

impl<S: KeyValueStore> CorrectionMemory<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LearningConfig::default())
    }

    pub fn with_config(store: S, config: LearningConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record that the user replaced `predicted` with `corrected` for `text`.
    ///
    /// Does not compare the two categories; callers only invoke this on a change.
    pub fn save_correction(&self, text: &str, predicted: &str, corrected: &str) {
        self.save_correction_at(text, predicted, corrected, now_millis());
    }

    /// Same as [`save_correction`](Self::save_correction) with an explicit timestamp.
    pub fn save_correction_at(&self, text: &str, predicted: &str, corrected: &str, timestamp: i64) {
        if let Err(e) = self.try_save(text, predicted, corrected, timestamp) {
            error!(error = %e, "Error saving correction");
        }
    }

    /// Save the user's final choice only when it changes the suggestion.
    ///
    /// Blank text and an empty suggestion are ignored, and so is a choice that
    /// differs from the suggestion only in case. Returns true when a correction
    /// was written.
    pub fn record_choice(&self, text: &str, suggested: &str, chosen: &str) -> bool {
        if text.trim().is_empty() || suggested.is_empty() || chosen.is_empty() {
            return false;
        }
        if suggested.to_lowercase() == chosen.to_lowercase() {
            return false;
        }
        self.save_correction(text, suggested, chosen);
        true
    }

    fn try_save(
        &self,
        text: &str,
        predicted: &str,
        corrected: &str,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        // An unreadable log is left untouched rather than replaced by a one-entry log.
        let mut log = self.load_log()?;
        log.push(CorrectionRecord::new(
            memory_key(text),
            predicted,
            corrected,
            timestamp,
        ));

        if log.len() > self.config.capacity {
            let excess = log.len() - self.config.capacity;
            log.drain(..excess);
        }

        let json = serde_json::to_string(&log)?;
        self.store.set(CORRECTIONS_KEY, &json)?;
        debug!(records = log.len(), "correction saved");
        Ok(())
    }

    /// Category the user previously chose for this (or similar) text.
    pub fn get_learned_category(&self, text: &str) -> Option<String> {
        let normalized = memory_key(text);
        // Every stored text contains the empty string, so an empty query would
        // match the newest record unconditionally.
        if normalized.is_empty() {
            return None;
        }

        let log = match self.load_log() {
            Ok(log) => log,
            Err(e) => {
                error!(error = %e, "Error getting learned category");
                return None;
            }
        };

        if let Some(hit) = latest(log.iter().filter(|r| r.text == normalized)) {
            debug!(
                text = %normalized,
                category = %hit.corrected_category,
                "exact correction match"
            );
            return Some(hit.corrected_category.clone());
        }

        let min_len = self.config.min_partial_len;
        let partial = latest(log.iter().filter(|r| {
            r.text.chars().count() >= min_len
                && (normalized.contains(r.text.as_str()) || r.text.contains(normalized.as_str()))
        }));

        partial.map(|hit| {
            debug!(
                text = %normalized,
                stored = %hit.text,
                category = %hit.corrected_category,
                "partial correction match"
            );
            hit.corrected_category.clone()
        })
    }

    /// Snapshot of the stored log, oldest first. Unreadable logs read as empty.
    pub fn records(&self) -> Vec<CorrectionRecord> {
        self.load_log().unwrap_or_else(|e| {
            error!(error = %e, "Error reading corrections");
            Vec::new()
        })
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_log(&self) -> Result<Vec<CorrectionRecord>, StoreError> {
        match self.store.get(CORRECTIONS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }
}

/// Latest timestamp; ties go to the record appended last.
fn latest<'a>(
    candidates: impl Iterator<Item = &'a CorrectionRecord>,
) -> Option<&'a CorrectionRecord> {
    candidates.max_by_key(|r| r.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn memory() -> CorrectionMemory<MemoryStore> {
        CorrectionMemory::new(MemoryStore::new())
    }

    #[test]
    fn test_exact_match_is_case_and_whitespace_insensitive() {
        let m = memory();
        m.save_correction("Grocery Run", "Other", "Food");
        assert_eq!(m.get_learned_category("grocery run").as_deref(), Some("Food"));
        assert_eq!(m.get_learned_category("  GROCERY RUN ").as_deref(), Some("Food"));
    }

    #[test]
    fn test_unknown_text_returns_none() {
        let m = memory();
        assert_eq!(m.get_learned_category("anything"), None);
        m.save_correction("netflix", "Other", "Entertainment");
        assert_eq!(m.get_learned_category("rent"), None);
    }

    #[test]
    fn test_record_choice_only_on_change() {
        let m = memory();
        assert!(!m.record_choice("coffee", "Food", "food"));
        assert!(!m.record_choice("coffee", "", "Food"));
        assert!(!m.record_choice(" ", "Other", "Food"));
        assert!(m.is_empty());

        assert!(m.record_choice("coffee", "Other", "Food"));
        let records = m.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].predicted_category, "Other");
        assert_eq!(records[0].corrected_category, "Food");
    }

    #[test]
    fn test_latest_exact_wins() {
        let m = memory();
        m.save_correction_at("uber", "Other", "Transport", 100);
        m.save_correction_at("uber", "Transport", "Bills", 200);
        m.save_correction_at("uber", "Bills", "Food", 150);
        assert_eq!(m.get_learned_category("uber").as_deref(), Some("Bills"));
    }

    #[test]
    fn test_timestamp_tie_goes_to_later_append() {
        let m = memory();
        m.save_correction_at("uber", "Other", "Transport", 100);
        m.save_correction_at("uber", "Other", "Bills", 100);
        assert_eq!(m.get_learned_category("uber").as_deref(), Some("Bills"));
    }

    #[test]
    fn test_partial_match_both_directions() {
        let m = memory();
        m.save_correction_at("uber", "Other", "Transport", 1);
        // query contains stored text
        assert_eq!(m.get_learned_category("Uber to airport").as_deref(), Some("Transport"));

        let m = memory();
        m.save_correction_at("monthly gym membership", "Other", "Health", 1);
        // stored text contains query
        assert_eq!(m.get_learned_category("gym").as_deref(), Some("Health"));
    }

    #[test]
    fn test_exact_beats_newer_partial() {
        let m = memory();
        m.save_correction_at("coffee", "Other", "Food", 10);
        m.save_correction_at("coffee beans", "Other", "Shopping", 20);
        assert_eq!(m.get_learned_category("coffee").as_deref(), Some("Food"));
    }

    #[test]
    fn test_latest_partial_wins() {
        let m = memory();
        m.save_correction_at("taxi", "Other", "Transport", 10);
        m.save_correction_at("airport", "Other", "Shopping", 20);
        assert_eq!(m.get_learned_category("taxi to airport").as_deref(), Some("Shopping"));
    }

    #[test]
    fn test_empty_query_returns_none() {
        let m = memory();
        m.save_correction("uber", "Other", "Transport");
        assert_eq!(m.get_learned_category(""), None);
        assert_eq!(m.get_learned_category("   "), None);
    }

    #[test]
    fn test_min_partial_len_guard() {
        let m = CorrectionMemory::with_config(
            MemoryStore::new(),
            LearningConfig {
                min_partial_len: 3,
                ..LearningConfig::default()
            },
        );
        m.save_correction_at("a", "Other", "Food", 1);
        assert_eq!(m.get_learned_category("taxi"), None);
        // exact matches ignore the guard
        assert_eq!(m.get_learned_category("a").as_deref(), Some("Food"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let m = CorrectionMemory::with_config(
            MemoryStore::new(),
            LearningConfig {
                capacity: 3,
                ..LearningConfig::default()
            },
        );
        for i in 0..5 {
            m.save_correction_at(&format!("item {i}"), "Other", "Food", i);
        }
        let texts: Vec<String> = m.records().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["item 2", "item 3", "item 4"]);
    }

    #[test]
    fn test_corrupt_log_reads_as_empty_and_is_not_overwritten() {
        let store = MemoryStore::new();
        store.set(CORRECTIONS_KEY, "{not json").unwrap();
        let m = CorrectionMemory::new(store);

        assert_eq!(m.get_learned_category("uber"), None);
        assert!(m.records().is_empty());

        m.save_correction("uber", "Other", "Transport");
        assert_eq!(
            m.store().get(CORRECTIONS_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_stored_text_is_normalized() {
        let m = memory();
        m.save_correction("  Phone BILL ", "Other", "Bills");
        let records = m.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "phone bill");
        assert_eq!(records[0].predicted_category, "Other");
    }
}
