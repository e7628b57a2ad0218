use std::path::PathBuf;

/// Classifier subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("failed to read {path}: {source}")]
    AssetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid asset {path}: {source}")]
    AssetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid asset {path}: {reason}")]
    AssetInvalid { path: PathBuf, reason: String },

    #[error("model load failed ({model}): {reason}")]
    ModelLoad { model: String, reason: String },

    #[error("inference failed: {reason}")]
    Inference { reason: String },

    #[error("unsupported model input: {reason}")]
    UnsupportedInput { reason: String },
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;
