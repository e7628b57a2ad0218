use std::path::PathBuf;

/// Persistence errors for the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key {key:?}: only [A-Za-z0-9_-] allowed")]
    InvalidKey { key: String },

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}
