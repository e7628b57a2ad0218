//! Suggestion pipeline: correction memory first, the model only on a miss.

use crate::classifier::Classifier;
use crate::error::ClassifierResult;
use serde::Serialize;
use std::fmt;
use tally_core::Category;
use tally_learning::{CorrectionMemory, KeyValueStore};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// A previous user correction
    Learned,
    /// The classifier
    Model,
}

impl fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionSource::Learned => write!(f, "learned"),
            SuggestionSource::Model => write!(f, "model"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub category: String,
    /// Model confidence; `None` for learned suggestions
    pub confidence: Option<f32>,
    pub source: SuggestionSource,
}

impl Suggestion {
    /// The app category this suggestion selects, if any.
    pub fn matched_category(&self) -> Option<Category> {
        Category::from_label(&self.category)
    }
}

pub struct SuggestionPipeline<S> {
    memory: CorrectionMemory<S>,
    classifier: Classifier,
}

impl<S: KeyValueStore> SuggestionPipeline<S> {
    pub fn new(memory: CorrectionMemory<S>, classifier: Classifier) -> Self {
        Self { memory, classifier }
    }

    pub fn memory(&self) -> &CorrectionMemory<S> {
        &self.memory
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Suggest a category for an expense name. Blank names get no suggestion.
    pub fn suggest(&self, text: &str) -> ClassifierResult<Option<Suggestion>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        if let Some(category) = self.memory.get_learned_category(text) {
            debug!(%category, "using learned category");
            return Ok(Some(Suggestion {
                category,
                confidence: None,
                source: SuggestionSource::Learned,
            }));
        }

        let prediction = self.classifier.predict_category(text)?;
        Ok(Some(Suggestion {
            category: prediction.category,
            confidence: Some(prediction.confidence),
            source: SuggestionSource::Model,
        }))
    }

    /// Store the user's final choice when it differs from what was suggested.
    ///
    /// Picking "food" after a "Food" suggestion is not a correction.
    pub fn record_choice(&self, text: &str, suggested: &str, chosen: &str) -> bool {
        self.memory.record_choice(text, suggested, chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ModelAssets;
    use crate::buffer::{InputBuffer, InputSpec};
    use crate::error::ClassifierError;
    use crate::labels::{LabelMap, LabelSet};
    use crate::model::{InferenceModel, ModelHandle};
    use crate::vocab::Vocabulary;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tally_learning::MemoryStore;

    struct Counting {
        runs: Arc<AtomicUsize>,
    }

    impl InferenceModel for Counting {
        fn input_spec(&self) -> InputSpec {
            InputSpec::default()
        }

        fn run(&self, _input: &InputBuffer) -> ClassifierResult<Vec<f32>> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.9, 0.1])
        }
    }

    fn pipeline(runs: Arc<AtomicUsize>) -> SuggestionPipeline<MemoryStore> {
        let handle = ModelHandle::new(move || -> ClassifierResult<Box<dyn InferenceModel>> {
            Ok(Box::new(Counting {
                runs: Arc::clone(&runs),
            }))
        });
        let assets = ModelAssets::new(
            Vocabulary::new(vec!["".into(), "[UNK]".into(), "uber".into()]),
            LabelSet::new(vec!["Travel".into(), "Food & Drink".into()]),
            LabelMap::default(),
        );
        SuggestionPipeline::new(
            CorrectionMemory::new(MemoryStore::new()),
            Classifier::new(Arc::new(handle), assets),
        )
    }

    #[test]
    fn test_model_used_without_corrections() {
        let runs = Arc::new(AtomicUsize::new(0));
        let p = pipeline(Arc::clone(&runs));
        let s = p.suggest("Uber to airport").unwrap().unwrap();
        assert_eq!(s.category, "Transport");
        assert_eq!(s.source, SuggestionSource::Model);
        assert_eq!(s.confidence, Some(0.9));
        assert_eq!(s.matched_category(), Some(Category::Transport));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_correction_skips_model() {
        let runs = Arc::new(AtomicUsize::new(0));
        let p = pipeline(Arc::clone(&runs));
        assert!(p.record_choice("Uber to airport", "Transport", "Bills"));

        let s = p.suggest("uber to airport").unwrap().unwrap();
        assert_eq!(s.category, "Bills");
        assert_eq!(s.source, SuggestionSource::Learned);
        assert_eq!(s.confidence, None);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(!p.classifier().model().is_loaded());
    }

    #[test]
    fn test_same_choice_is_not_a_correction() {
        let p = pipeline(Arc::new(AtomicUsize::new(0)));
        assert!(!p.record_choice("uber", "Transport", "transport"));
        assert!(!p.record_choice("uber", "", "Food"));
        assert!(!p.record_choice("  ", "Transport", "Food"));
        assert!(p.memory().is_empty());
    }

    #[test]
    fn test_blank_text_has_no_suggestion() {
        let runs = Arc::new(AtomicUsize::new(0));
        let p = pipeline(Arc::clone(&runs));
        assert_eq!(p.suggest("   ").unwrap(), None);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_load_failure_propagates() {
        let handle = ModelHandle::new(|| -> ClassifierResult<Box<dyn InferenceModel>> {
            Err(ClassifierError::ModelLoad {
                model: "missing".to_string(),
                reason: "gone".to_string(),
            })
        });
        let assets = ModelAssets::new(
            Vocabulary::new(vec!["".into(), "[UNK]".into()]),
            LabelSet::default(),
            LabelMap::default(),
        );
        let p = SuggestionPipeline::new(
            CorrectionMemory::new(MemoryStore::new()),
            Classifier::new(Arc::new(handle), assets),
        );
        assert!(p.suggest("uber").is_err());

        // learned categories still work without a model
        p.memory().save_correction("uber", "Other", "Transport");
        assert_eq!(p.suggest("uber").unwrap().unwrap().category, "Transport");
    }
}
