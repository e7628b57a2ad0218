//! Confidence-gated decision over the model's score vector.
//!
//! A label is accepted only when both hold:
//! - the top score reaches `min_confidence`
//! - the top score leads the runner-up by at least `min_gap`
//!
//! Otherwise the caller falls back to "Other".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionRule {
    pub min_confidence: f32,
    pub min_gap: f32,
}

impl Default for DecisionRule {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            min_gap: 0.05,
        }
    }
}

/// Best and second-best scores from a single scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopTwo {
    /// `None` when no score beat the initial -1 (empty or all-NaN input)
    pub best_index: Option<usize>,
    pub best: f32,
    pub second: f32,
}

impl TopTwo {
    pub fn gap(&self) -> f32 {
        self.best - self.second
    }
}

/// Streaming max / second-max.
///
/// Both start at -1. A score strictly greater than `best` demotes `best` to
/// `second`; otherwise it replaces `second` only if strictly greater. So a later
/// tie with `best` becomes `second` (gap 0), and a later tie with `second`
/// changes nothing. NaN compares false everywhere and is never picked.
pub fn top_two(scores: &[f32]) -> TopTwo {
    let mut best = -1.0f32;
    let mut second = -1.0f32;
    let mut best_index = None;

    for (i, &s) in scores.iter().enumerate() {
        if s > best {
            second = best;
            best = s;
            best_index = Some(i);
        } else if s > second {
            second = s;
        }
    }

    TopTwo {
        best_index,
        best,
        second,
    }
}

/// Largest non-NaN score; 0.0 for an empty or all-NaN vector.
pub fn max_score(scores: &[f32]) -> f32 {
    scores
        .iter()
        .copied()
        .filter(|s| !s.is_nan())
        .reduce(f32::max)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Winning position and its score
    Confident { index: usize, score: f32 },
    /// Not confident enough; carries the top score
    Uncertain { score: f32 },
}

impl DecisionRule {
    pub fn decide(&self, scores: &[f32]) -> Decision {
        let top = top_two(scores);
        let Some(index) = top.best_index else {
            return Decision::Uncertain { score: 0.0 };
        };

        if top.best < self.min_confidence || top.gap() < self.min_gap {
            Decision::Uncertain { score: top.best }
        } else {
            Decision::Confident {
                index,
                score: top.best,
            }
        }
    }
}
