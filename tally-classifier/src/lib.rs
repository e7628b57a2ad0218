//! tally-classifier: expense-name tokenizer, inference wrapper, decision rule, and
//! the suggestion pipeline that puts user corrections in front of the model

pub mod assets;
pub mod buffer;
pub mod classifier;
pub mod decision;
pub mod dense;
pub mod error;
pub mod labels;
pub mod model;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod pipeline;
pub mod tokenizer;
pub mod vocab;

pub use assets::{loader_for_path, ModelAssets};
pub use buffer::{ElementKind, InputBuffer, InputSpec};
pub use classifier::Classifier;
pub use decision::{max_score, top_two, Decision, DecisionRule, TopTwo};
pub use dense::{DenseModel, DenseModelLoader};
pub use error::{ClassifierError, ClassifierResult};
pub use labels::{LabelMap, LabelSet};
pub use model::{InferenceModel, LoadedModel, ModelHandle, ModelLoader};
pub use pipeline::{Suggestion, SuggestionPipeline, SuggestionSource};
pub use tokenizer::{TokenizedInput, Tokenizer};
pub use vocab::{levenshtein, Vocabulary, PAD_INDEX, UNK_INDEX};
