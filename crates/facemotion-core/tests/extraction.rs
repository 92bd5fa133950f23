//! Tests for the stage-1 extraction pipeline.
//!
//! These live as an integration test rather than a unit test module:
//! the mocks in `facemotion-test-support` implement the ports of the
//! externally built `facemotion-core`, which a `#[cfg(test)]` module
//! inside the crate would see as a different crate.

#![allow(clippy::unwrap_used)]

use facemotion_core::{extract_features, Emotion, ExtractionConfig};
use facemotion_test_support::{
    full_blendshapes, sample_with_value, MockDetector, MockFeatureSink, MockProgressSink,
    MockSampleSource,
};

#[test]
fn test_every_row_extracted_or_skipped() {
    let source = MockSampleSource::new(vec![
        sample_with_value(Emotion::Happy, 100),
        sample_with_value(Emotion::Sad, 120),
        sample_with_value(Emotion::Angry, 140),
    ]);
    // Face on rows 0 and 2, nothing on row 1.
    let detector = MockDetector::scripted(vec![
        vec![full_blendshapes(0.4)],
        vec![],
        vec![full_blendshapes(0.6)],
    ]);
    let mut sink = MockFeatureSink::new();
    let progress = MockProgressSink::new();

    let outcome = extract_features(
        &source,
        &detector,
        &mut sink,
        &progress,
        &ExtractionConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.extracted, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.total, outcome.extracted + outcome.skipped);

    let rows = sink.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].emotion, Emotion::Happy);
    assert_eq!(rows[1].emotion, Emotion::Angry);
    assert_eq!(sink.finish_count(), 1);
}

#[test]
fn test_first_face_wins_on_multi_face_images() {
    let source = MockSampleSource::new(vec![sample_with_value(Emotion::Fear, 90)]);
    let detector = MockDetector::scripted(vec![vec![
        full_blendshapes(0.9),
        full_blendshapes(0.1),
    ]]);
    let mut sink = MockFeatureSink::new();

    extract_features(
        &source,
        &detector,
        &mut sink,
        &MockProgressSink::new(),
        &ExtractionConfig::default(),
    )
    .unwrap();

    let rows = sink.rows();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].scores.iter().all(|&s| (s - 0.9).abs() < 1e-6));
}

#[test]
fn test_row_limit_caps_extracted_rows() {
    let samples: Vec<_> = (0..5).map(|_| sample_with_value(Emotion::Neutral, 50)).collect();
    let source = MockSampleSource::new(samples);
    let detector = MockDetector::always(vec![full_blendshapes(0.5)]);
    let mut sink = MockFeatureSink::new();

    let outcome = extract_features(
        &source,
        &detector,
        &mut sink,
        &MockProgressSink::new(),
        &ExtractionConfig { row_limit: Some(2) },
    )
    .unwrap();

    assert_eq!(outcome.extracted, 2);
    assert_eq!(sink.rows().len(), 2);
}

#[test]
fn test_progress_events() {
    let source = MockSampleSource::new(vec![
        sample_with_value(Emotion::Happy, 100),
        sample_with_value(Emotion::Sad, 110),
    ]);
    let detector = MockDetector::scripted(vec![vec![full_blendshapes(0.3)], vec![]]);
    let mut sink = MockFeatureSink::new();
    let progress = MockProgressSink::new();

    extract_features(
        &source,
        &detector,
        &mut sink,
        &progress,
        &ExtractionConfig::default(),
    )
    .unwrap();

    assert_eq!(progress.started_count(), 2);
    assert_eq!(progress.completed_count(), 1);
    assert_eq!(progress.skipped_count(), 1);
    assert_eq!(progress.finished_counts(), Some((1, 1)));
}

#[test]
fn test_empty_source() {
    let source = MockSampleSource::empty();
    let detector = MockDetector::always(vec![]);
    let mut sink = MockFeatureSink::new();
    let progress = MockProgressSink::new();

    let outcome = extract_features(
        &source,
        &detector,
        &mut sink,
        &progress,
        &ExtractionConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.total, 0);
    assert!(sink.rows().is_empty());
    assert_eq!(progress.finished_counts(), Some((0, 0)));
}

#[test]
fn test_detector_error_is_fatal() {
    let source = MockSampleSource::new(vec![sample_with_value(Emotion::Happy, 100)]);
    let detector = MockDetector::failing("model exploded");
    let mut sink = MockFeatureSink::new();

    let result = extract_features(
        &source,
        &detector,
        &mut sink,
        &MockProgressSink::new(),
        &ExtractionConfig::default(),
    );

    assert!(result.is_err());
    assert!(sink.rows().is_empty());
}
