use serde::{Deserialize, Serialize};

/// One user override of a suggested category.
///
/// Serialized with camelCase keys so logs written by the mobile app read back as-is:
/// `{ "text", "predictedCategory", "correctedCategory", "timestamp" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRecord {
    /// Lowercased, trimmed expense name
    pub text: String,
    pub predicted_category: String,
    pub corrected_category: String,
    /// Unix milliseconds at insertion
    pub timestamp: i64,
}

impl CorrectionRecord {
    pub fn new(
        text: impl Into<String>,
        predicted_category: impl Into<String>,
        corrected_category: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            text: text.into(),
            predicted_category: predicted_category.into(),
            corrected_category: corrected_category.into(),
            timestamp,
        }
    }
}
