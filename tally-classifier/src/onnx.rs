//! ONNX Runtime backend.
//!
//! Loads a model via the `ort` crate (v2). The input shape and element type are
//! read from the session's first input; scores come from the first output.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{DynValue, Tensor, TensorElementType, ValueType};
use tracing::debug;

use crate::buffer::{ElementKind, InputBuffer, InputSpec};
use crate::error::{ClassifierError, ClassifierResult};
use crate::model::{InferenceModel, ModelLoader};

pub struct OnnxModel {
    /// `run` needs `&mut Session`
    session: Mutex<Session>,
    input: InputSpec,
    name: String,
}

impl OnnxModel {
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        let load_err = |reason: String| ClassifierError::ModelLoad {
            model: path.display().to_string(),
            reason,
        };

        if !path.exists() {
            return Err(load_err("model file not found".to_string()));
        }

        let session = Session::builder()
            .map_err(|e| load_err(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| load_err(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e| load_err(e.to_string()))?;

        let input = session
            .inputs()
            .first()
            .map(|i| input_spec_of(i.dtype()))
            .unwrap_or_default();
        check_supported(&input)?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx-model")
            .to_string();

        debug!(
            model = %name,
            shape = ?input.shape,
            input_type = input.kind.name(),
            "ONNX model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            input,
            name,
        })
    }

    fn tensor_for(&self, input: &InputBuffer) -> ClassifierResult<DynValue> {
        let mut shape: Vec<i64> = self
            .input
            .shape
            .iter()
            .map(|&d| if d > 0 { d } else { 1 })
            .collect();
        if shape.is_empty() {
            shape = vec![1, input.len() as i64];
        }

        let tensor_err = |e: ort::Error| ClassifierError::Inference {
            reason: format!("tensor creation error: {e}"),
        };

        macro_rules! tensor {
            ($data:expr) => {
                Tensor::from_array((shape, $data.clone())).map(|t| t.into_dyn())
            };
        }

        let value = match input {
            InputBuffer::Int32(v) => tensor!(v),
            InputBuffer::Uint8(v) => tensor!(v),
            InputBuffer::Int8(v) => tensor!(v),
            InputBuffer::Int16(v) => tensor!(v),
            InputBuffer::Float32(v) => tensor!(v),
            InputBuffer::Float64(v) => tensor!(v),
            InputBuffer::Float16(_) => return Err(float16_unsupported()),
        };
        value.map_err(tensor_err)
    }
}

impl InferenceModel for OnnxModel {
    fn input_spec(&self) -> InputSpec {
        self.input.clone()
    }

    fn run(&self, input: &InputBuffer) -> ClassifierResult<Vec<f32>> {
        let value = self.tensor_for(input)?;

        let mut session = self.session.lock().map_err(|e| ClassifierError::Inference {
            reason: format!("session lock poisoned: {e}"),
        })?;

        let outputs = session
            .run(ort::inputs![value])
            .map_err(|e| ClassifierError::Inference {
                reason: e.to_string(),
            })?;

        let (_name, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifierError::Inference {
                reason: "no output tensor".to_string(),
            })?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference {
                reason: format!("tensor extraction failed: {e}"),
            })?;

        Ok(data.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Float16 inputs are refused at load time rather than on every `run`.
fn check_supported(input: &InputSpec) -> ClassifierResult<()> {
    match input.kind {
        ElementKind::Float16 => Err(float16_unsupported()),
        _ => Ok(()),
    }
}

fn float16_unsupported() -> ClassifierError {
    ClassifierError::UnsupportedInput {
        reason: "float16 tensors are not supported by the ONNX backend".to_string(),
    }
}

fn input_spec_of(ty: &ValueType) -> InputSpec {
    match ty {
        ValueType::Tensor { ty, shape, .. } => {
            InputSpec::new(shape.iter().copied().collect(), kind_of(*ty))
        }
        _ => InputSpec::default(),
    }
}

fn kind_of(ty: TensorElementType) -> ElementKind {
    match ty {
        TensorElementType::Int32 => ElementKind::Int32,
        TensorElementType::Uint8 => ElementKind::Uint8,
        TensorElementType::Int8 => ElementKind::Int8,
        TensorElementType::Int16 => ElementKind::Int16,
        TensorElementType::Float16 => ElementKind::Float16,
        TensorElementType::Float64 => ElementKind::Float64,
        _ => ElementKind::Float32,
    }
}

/// Loads an [`OnnxModel`] from a `.onnx` file.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    path: PathBuf,
}

impl OnnxModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self) -> ClassifierResult<Box<dyn InferenceModel>> {
        Ok(Box::new(OnnxModel::load(&self.path)?))
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.path.display())
    }
}
