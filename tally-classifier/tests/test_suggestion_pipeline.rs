use std::fs;
use std::path::Path;
use std::sync::Arc;

use tally_classifier::{
    loader_for_path, Classifier, ModelAssets, ModelHandle, SuggestionPipeline, SuggestionSource,
};
use tally_core::{Category, OTHER_LABEL};
use tally_learning::{CorrectionMemory, JsonFileStore};

const VOCAB: &str = r#"["", "[UNK]", "uber", "taxi", "coffee", "pizza", "mobile", "bill", "mobile bill"]"#;
const LABELS: &str = r#"["Food & Drink", "Travel", "Bills & Utilities"]"#;

/// One dense row per label, one column per vocabulary position.
const MODEL: &str = r#"{
    "weights": [
        [0, 0, 0, 0, 6, 6, 0, 0, 0],
        [0, 0, 6, 6, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 3, 3, 3]
    ],
    "bias": [0, 0, 0],
    "activation": "softmax"
}"#;

fn write_assets(dir: &Path) {
    fs::write(dir.join("vocab.json"), VOCAB).unwrap();
    fs::write(dir.join("labels.json"), LABELS).unwrap();
    fs::write(dir.join("model.json"), MODEL).unwrap();
}

fn classifier(dir: &Path) -> Classifier {
    let assets = ModelAssets::load_dir(dir).unwrap();
    let handle = ModelHandle::from_boxed(loader_for_path(&dir.join("model.json")).unwrap());
    Classifier::new(Arc::new(handle), assets)
}

#[test]
fn test_dense_model_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let c = classifier(dir.path());

    let p = c.predict_category("Uber to airport").unwrap();
    assert_eq!(p.category, "Transport");
    assert!(p.confidence > 0.99);

    // "phone" is an alias of "mobile"
    assert_eq!(c.predict_category("Phone Bill").unwrap().category, "Bills");

    // plural and typo tolerance
    assert_eq!(c.predict_category("two taxis").unwrap().category, "Transport");
    assert_eq!(c.predict_category("cofee").unwrap().category, "Food");
}

#[test]
fn test_unknown_or_empty_text_is_other() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let c = classifier(dir.path());

    for text in ["", "!!!", "zzzz qqqq"] {
        let p = c.predict_category(text).unwrap();
        assert_eq!(p.category, OTHER_LABEL, "text {text:?}");
        assert!((p.confidence - 1.0 / 3.0).abs() < 1e-5);
    }
}

#[test]
fn test_model_file_missing_then_restored() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    fs::remove_file(dir.path().join("model.json")).unwrap();
    let c = classifier(dir.path());

    assert!(c.predict_category("uber").is_err());
    assert!(!c.model().is_loaded());

    fs::write(dir.path().join("model.json"), MODEL).unwrap();
    assert_eq!(c.predict_category("uber").unwrap().category, "Transport");
    assert!(c.model().is_loaded());
}

#[test]
fn test_labels_longer_than_outputs_is_uncategorized() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    fs::write(
        dir.path().join("labels.json"),
        r#"["Food & Drink", "Travel", "Bills & Utilities", "Health"]"#,
    )
    .unwrap();
    let c = classifier(dir.path());

    let p = c.predict_category("uber").unwrap();
    assert_eq!(p.category, "Uncategorized");
    assert!(p.confidence > 0.99);
}

#[test]
fn test_corrections_override_model_across_restarts() {
    let assets = tempfile::tempdir().unwrap();
    let state = tempfile::tempdir().unwrap();
    write_assets(assets.path());

    {
        let pipeline = SuggestionPipeline::new(
            CorrectionMemory::new(JsonFileStore::new(state.path())),
            classifier(assets.path()),
        );
        let first = pipeline.suggest("Uber to airport").unwrap().unwrap();
        assert_eq!(first.source, SuggestionSource::Model);
        assert_eq!(first.matched_category(), Some(Category::Transport));

        assert!(pipeline.record_choice("Uber to airport", &first.category, "Bills"));
    }

    let pipeline = SuggestionPipeline::new(
        CorrectionMemory::new(JsonFileStore::new(state.path())),
        classifier(assets.path()),
    );

    let exact = pipeline.suggest("  UBER TO AIRPORT ").unwrap().unwrap();
    assert_eq!(exact.category, "Bills");
    assert_eq!(exact.source, SuggestionSource::Learned);

    // stored text contains the query
    let partial = pipeline.suggest("uber").unwrap().unwrap();
    assert_eq!(partial.category, "Bills");
    assert_eq!(partial.source, SuggestionSource::Learned);

    // the model is never loaded while corrections answer
    assert!(!pipeline.classifier().model().is_loaded());

    let other = pipeline.suggest("pizza night").unwrap().unwrap();
    assert_eq!(other.category, "Food");
    assert_eq!(other.source, SuggestionSource::Model);
}
