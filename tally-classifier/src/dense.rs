//! Pure-Rust backend: a single dense layer followed by softmax.
//!
//! Weight file (`model.json`):
//! ```json
//! { "weights": [[...], ...], "bias": [...], "activation": "softmax",
//!   "input_shape": [1, 5000], "input_type": "float32" }
//! ```
//! `weights` has one row per label and one column per vocabulary position.
//! `input_shape` / `input_type` are optional and default to `[1, columns]` / float32.

use crate::buffer::{ElementKind, InputBuffer, InputSpec};
use crate::error::{ClassifierError, ClassifierResult};
use crate::model::{InferenceModel, ModelLoader};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Softmax,
    /// Scores are used as-is
    None,
}

#[derive(Debug, Clone, Deserialize)]
struct DenseFile {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    #[serde(default)]
    activation: Activation,
    #[serde(default)]
    input_shape: Option<Vec<i64>>,
    #[serde(default)]
    input_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DenseModel {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    activation: Activation,
    input: InputSpec,
    name: String,
}

impl DenseModel {
    pub fn new(
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        activation: Activation,
    ) -> ClassifierResult<Self> {
        let columns = weights.first().map(Vec::len).unwrap_or(0);
        let input = InputSpec::new(vec![1, columns as i64], ElementKind::Float32);
        Self::with_input(weights, bias, activation, input)
    }

    fn with_input(
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        activation: Activation,
        input: InputSpec,
    ) -> ClassifierResult<Self> {
        let invalid = |reason: String| ClassifierError::ModelLoad {
            model: "dense".to_string(),
            reason,
        };

        if weights.is_empty() {
            return Err(invalid("no weight rows".to_string()));
        }
        let columns = weights[0].len();
        if let Some((i, row)) = weights.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(invalid(format!(
                "row {i} has {} columns, expected {columns}",
                row.len()
            )));
        }
        if bias.len() != weights.len() {
            return Err(invalid(format!(
                "bias has {} entries for {} rows",
                bias.len(),
                weights.len()
            )));
        }
        let declared = input.element_count();
        if declared != 0 && declared != columns {
            return Err(invalid(format!(
                "input_shape {:?} has {declared} elements, weights expect {columns}",
                input.shape
            )));
        }

        Ok(Self {
            weights,
            bias,
            activation,
            input,
            name: "dense".to_string(),
        })
    }

    pub fn from_file(path: &Path) -> ClassifierResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ClassifierError::ModelLoad {
            model: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let file: DenseFile = serde_json::from_str(&raw).map_err(|e| ClassifierError::ModelLoad {
            model: path.display().to_string(),
            reason: format!("parse weights: {e}"),
        })?;

        let columns = file.weights.first().map(Vec::len).unwrap_or(0);
        let input = InputSpec::new(
            file.input_shape.unwrap_or_else(|| vec![1, columns as i64]),
            file.input_type
                .as_deref()
                .map(ElementKind::from_name)
                .unwrap_or_default(),
        );

        let mut model = Self::with_input(file.weights, file.bias, file.activation, input)?;
        model.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dense")
            .to_string();
        Ok(model)
    }

    pub fn labels(&self) -> usize {
        self.weights.len()
    }

    pub fn columns(&self) -> usize {
        self.weights[0].len()
    }
}

impl InferenceModel for DenseModel {
    fn input_spec(&self) -> InputSpec {
        self.input.clone()
    }

    fn run(&self, input: &InputBuffer) -> ClassifierResult<Vec<f32>> {
        let x = input.to_f32_vec();
        if x.len() != self.columns() {
            return Err(ClassifierError::Inference {
                reason: format!(
                    "input has {} features, weights expect {}",
                    x.len(),
                    self.columns()
                ),
            });
        }

        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(&x).map(|(w, v)| w * v).sum::<f32>() + b)
            .collect();

        Ok(match self.activation {
            Activation::Softmax => softmax(&logits),
            Activation::None => logits,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Loads a [`DenseModel`] from a JSON weight file.
#[derive(Debug, Clone)]
pub struct DenseModelLoader {
    path: PathBuf,
}

impl DenseModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for DenseModelLoader {
    fn load(&self) -> ClassifierResult<Box<dyn InferenceModel>> {
        Ok(Box::new(DenseModel::from_file(&self.path)?))
    }

    fn describe(&self) -> String {
        format!("dense:{}", self.path.display())
    }
}
