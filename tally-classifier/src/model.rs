//! Inference model seam and the once-loaded, shared model handle.
//!
//! `ModelHandle` replaces a module-level cached model: callers hold an
//! `Arc<ModelHandle>`, tests build one around a fake loader.

use crate::buffer::{InputBuffer, InputSpec};
use crate::error::ClassifierResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info};

/// A loaded model that scores one feature buffer at a time.
pub trait InferenceModel: Send + Sync {
    /// Declared input shape and element type.
    fn input_spec(&self) -> InputSpec;

    /// One score per label, assumed already normalized (softmax).
    fn run(&self, input: &InputBuffer) -> ClassifierResult<Vec<f32>>;

    fn name(&self) -> &str {
        "model"
    }
}

/// Produces a model on first use.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> ClassifierResult<Box<dyn InferenceModel>>;

    /// Human-readable source (path, backend) for logs and errors.
    fn describe(&self) -> String;
}

impl<F> ModelLoader for F
where
    F: Fn() -> ClassifierResult<Box<dyn InferenceModel>> + Send + Sync,
{
    fn load(&self) -> ClassifierResult<Box<dyn InferenceModel>> {
        self()
    }

    fn describe(&self) -> String {
        "in-process loader".to_string()
    }
}

/// A model plus the input spec read from it once at load time.
pub struct LoadedModel {
    model: Box<dyn InferenceModel>,
    input: InputSpec,
}

impl LoadedModel {
    pub fn input(&self) -> &InputSpec {
        &self.input
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn run(&self, input: &InputBuffer) -> ClassifierResult<Vec<f32>> {
        self.model.run(input)
    }
}

/// Process-wide model slot.
///
/// The slot lock is held for the whole load, so concurrent `load` calls collapse
/// into one real load. A failed load leaves the slot empty and the next call
/// tries again.
pub struct ModelHandle {
    loader: Box<dyn ModelLoader>,
    slot: Mutex<Option<Arc<LoadedModel>>>,
}

impl ModelHandle {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self::from_boxed(Box::new(loader))
    }

    pub fn from_boxed(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            slot: Mutex::new(None),
        }
    }

    /// Load the model if it is not loaded yet.
    pub fn load(&self) -> ClassifierResult<()> {
        self.get().map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        self.lock_slot().is_some()
    }

    /// The loaded model, loading it first if needed.
    pub fn get(&self) -> ClassifierResult<Arc<LoadedModel>> {
        let mut slot = self.lock_slot();

        if let Some(loaded) = slot.as_ref() {
            return Ok(Arc::clone(loaded));
        }

        match self.loader.load() {
            Ok(model) => {
                let input = model.input_spec();
                info!(
                    model = model.name(),
                    source = %self.loader.describe(),
                    shape = ?input.shape,
                    input_type = input.kind.name(),
                    "model loaded"
                );
                let loaded = Arc::new(LoadedModel { model, input });
                *slot = Some(Arc::clone(&loaded));
                Ok(loaded)
            }
            Err(e) => {
                error!(source = %self.loader.describe(), error = %e, "failed to load model");
                Err(e)
            }
        }
    }

    /// A loader that panicked poisons the lock but never filled the slot, so
    /// the guard is still valid and the next call retries the load.
    fn lock_slot(&self) -> MutexGuard<'_, Option<Arc<LoadedModel>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
