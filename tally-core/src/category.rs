//! User-facing expense categories and the prediction result type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label returned when the classifier is not confident enough.
pub const OTHER_LABEL: &str = "Other";

/// Label returned when the model output does not line up with the label table.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Categories an expense can be filed under in the app
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "bills")]
    Bills,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Bills,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    /// Storage key (lowercase)
    pub fn key(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Bills => "bills",
            Category::Health => "health",
            Category::Education => "education",
            Category::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => OTHER_LABEL,
        }
    }

    /// Match a suggestion label (case-insensitive) to a category.
    /// "Uncategorized" and unknown labels resolve to `None`.
    pub fn from_label(label: &str) -> Option<Category> {
        let wanted = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of the neural classifier for one expense name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// User-facing category label, or "Other" / "Uncategorized"
    pub category: String,
    /// Top score from the model output
    pub confidence: f32,
}

impl Prediction {
    pub fn new(category: impl Into<String>, confidence: f32) -> Self {
        Self {
            category: category.into(),
            confidence,
        }
    }

    /// True for the low-confidence fallback
    pub fn is_other(&self) -> bool {
        self.category == OTHER_LABEL
    }

    /// True when model output and label table disagreed in size
    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED_LABEL
    }
}
