//! tally-learning: user correction log that overrides model suggestions

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use memory::{CorrectionMemory, LearningConfig, CORRECTIONS_KEY, DEFAULT_CAPACITY};
pub use record::CorrectionRecord;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
