//! Build-time assets: vocabulary, labels, optional label remapping, and the model file.
//!
//! Asset directory layout:
//! - `vocab.json`      JSON array of tokens (position = feature index)
//! - `labels.json`     JSON array of raw model labels
//! - `label_map.json`  optional object, raw label → app category
//! - `model.json` / `model.onnx`

use crate::dense::DenseModelLoader;
use crate::error::{ClassifierError, ClassifierResult};
use crate::labels::{LabelMap, LabelSet};
use crate::model::ModelLoader;
use crate::vocab::Vocabulary;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const VOCAB_FILE: &str = "vocab.json";
pub const LABELS_FILE: &str = "labels.json";
pub const LABEL_MAP_FILE: &str = "label_map.json";

#[derive(Debug, Clone)]
pub struct ModelAssets {
    pub vocabulary: Arc<Vocabulary>,
    pub labels: LabelSet,
    pub label_map: LabelMap,
}

impl ModelAssets {
    pub fn new(vocabulary: Vocabulary, labels: LabelSet, label_map: LabelMap) -> Self {
        Self {
            vocabulary: Arc::new(vocabulary),
            labels,
            label_map,
        }
    }

    /// Load vocabulary, labels and (if present) the label map from `dir`.
    pub fn load_dir(dir: &Path) -> ClassifierResult<Self> {
        let words: Vec<String> = read_json(&dir.join(VOCAB_FILE))?;
        let labels: Vec<String> = read_json(&dir.join(LABELS_FILE))?;

        if words.is_empty() {
            return Err(ClassifierError::AssetInvalid {
                path: dir.join(VOCAB_FILE),
                reason: "vocabulary is empty".to_string(),
            });
        }

        let map_path = dir.join(LABEL_MAP_FILE);
        let label_map = if map_path.exists() {
            LabelMap::new(read_json::<HashMap<String, String>>(&map_path)?)
        } else {
            LabelMap::default()
        };

        debug!(
            vocab = words.len(),
            labels = labels.len(),
            remapped = label_map.len(),
            dir = %dir.display(),
            "assets loaded"
        );

        Ok(Self::new(
            Vocabulary::new(words),
            LabelSet::new(labels),
            label_map,
        ))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ClassifierResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| ClassifierError::AssetIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ClassifierError::AssetParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick a backend from the model file extension.
pub fn loader_for_path(path: &Path) -> ClassifierResult<Box<dyn ModelLoader>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Box::new(DenseModelLoader::new(path))),
        #[cfg(feature = "onnx")]
        Some("onnx") => Ok(Box::new(crate::onnx::OnnxModelLoader::new(path))),
        #[cfg(not(feature = "onnx"))]
        Some("onnx") => Err(ClassifierError::ModelLoad {
            model: path.display().to_string(),
            reason: "built without the `onnx` feature".to_string(),
        }),
        _ => Err(ClassifierError::ModelLoad {
            model: path.display().to_string(),
            reason: "unknown model format (expected .json or .onnx)".to_string(),
        }),
    }
}
