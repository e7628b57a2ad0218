//! Expense-name classifier: tokenize → infer → confidence-gated label.

use crate::assets::ModelAssets;
use crate::decision::{max_score, Decision, DecisionRule};
use crate::error::ClassifierResult;
use crate::labels::{LabelMap, LabelSet};
use crate::model::ModelHandle;
use crate::tokenizer::Tokenizer;
use std::sync::Arc;
use tally_core::{Prediction, OTHER_LABEL, UNCATEGORIZED_LABEL};
use tracing::{debug, warn};

pub struct Classifier {
    model: Arc<ModelHandle>,
    tokenizer: Tokenizer,
    labels: LabelSet,
    label_map: LabelMap,
    rule: DecisionRule,
}

impl Classifier {
    pub fn new(model: Arc<ModelHandle>, assets: ModelAssets) -> Self {
        Self {
            model,
            tokenizer: Tokenizer::new(assets.vocabulary),
            labels: assets.labels,
            label_map: assets.label_map,
            rule: DecisionRule::default(),
        }
    }

    pub fn with_rule(mut self, rule: DecisionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn rule(&self) -> &DecisionRule {
        &self.rule
    }

    /// Load the model ahead of the first prediction.
    pub fn load_model(&self) -> ClassifierResult<()> {
        self.model.load()
    }

    /// Predict the category for an expense name.
    ///
    /// Loads the model on first use; a load failure is returned so the caller
    /// can show an "Other" state and retry later.
    pub fn predict_category(&self, text: &str) -> ClassifierResult<Prediction> {
        let model = self.model.get()?;
        let encoded = self.tokenizer.tokenize(text, model.input());
        let scores = model.run(&encoded.buffer)?;
        debug!(scores = ?scores, "raw scores");
        Ok(self.classify_scores(&scores))
    }

    /// Turn a raw score vector into a prediction.
    pub fn classify_scores(&self, scores: &[f32]) -> Prediction {
        if scores.len() != self.labels.len() {
            warn!(
                labels = self.labels.len(),
                outputs = scores.len(),
                "Label/output size mismatch"
            );
            return Prediction::new(UNCATEGORIZED_LABEL, max_score(scores));
        }

        debug!(top3 = ?self.top3(scores), "prediction");

        match self.rule.decide(scores) {
            Decision::Uncertain { score } => Prediction::new(OTHER_LABEL, score),
            Decision::Confident { index, score } => {
                // index < scores.len() == labels.len()
                let raw = self.labels.get(index).unwrap_or(OTHER_LABEL);
                Prediction::new(self.label_map.map(raw), score)
            }
        }
    }

    fn top3(&self, scores: &[f32]) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = self
            .labels
            .as_slice()
            .iter()
            .cloned()
            .zip(scores.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(3);
        ranked
    }
}
