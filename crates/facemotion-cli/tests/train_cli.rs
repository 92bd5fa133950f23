//! Trainer binary tests.
//!
//! The trainer reads fixed file names from its working directory, so each
//! test runs in its own temp directory. The end-to-end test trains on a
//! small synthetic table; the model is tiny so the full epoch budget runs
//! quickly on CPU.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use facemotion_core::domain::Emotion;
use facemotion_test_support::feature_csv_text;
use predicates::prelude::*;

const FEATURES_FILE: &str = "fer2013_blendshape_features.csv";
const CLASSIFIER_FILE: &str = "emotion_classifier.safetensors";

#[test]
fn test_missing_feature_table_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("facemotion-train").unwrap();
    cmd.current_dir(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("run the extractor first"));
}

#[test]
fn test_empty_feature_table_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(FEATURES_FILE), feature_csv_text(&[])).unwrap();

    let mut cmd = Command::cargo_bin("facemotion-train").unwrap();
    cmd.current_dir(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn test_trains_reports_and_exports() {
    let dir = tempfile::tempdir().unwrap();

    // One row per class plus extra happy rows, so the test partition is
    // non-empty (singleton classes stay entirely in train).
    let labels = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Happy,
        Emotion::Happy,
    ];
    std::fs::write(dir.path().join(FEATURES_FILE), feature_csv_text(&labels)).unwrap();

    // A stale export must be overwritten, not appended to.
    std::fs::write(dir.path().join(CLASSIFIER_FILE), b"stale").unwrap();

    let mut cmd = Command::cargo_bin("facemotion-train").unwrap();
    cmd.current_dir(dir.path());

    let assert = cmd.assert().success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);

    for name in Emotion::NAMES {
        assert!(stdout.contains(name), "report should list {name}");
    }
    assert!(stdout.contains("accuracy"));
    assert!(stdout.contains("macro avg"));
    assert!(stdout.contains("weighted avg"));

    let export = std::fs::read(dir.path().join(CLASSIFIER_FILE)).unwrap();
    assert_ne!(export, b"stale");
    assert!(export.len() > 64);
}
