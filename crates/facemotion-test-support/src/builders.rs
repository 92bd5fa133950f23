//! Synthetic data builders for testing.

use facemotion_core::domain::{
    Emotion, FaceBlendshapes, PixelSample, BLENDSHAPE_NAMES, PIXELS_PER_IMAGE,
};

/// A valid FER2013 pixel string: 2304 copies of one value.
#[must_use]
pub fn pixel_string(value: u8) -> String {
    vec![value.to_string(); PIXELS_PER_IMAGE].join(" ")
}

/// A parsed sample with a uniform pixel buffer.
///
/// # Panics
///
/// Panics if the generated row fails to parse, which would be a builder bug.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sample_with_value(emotion: Emotion, value: u8) -> PixelSample {
    PixelSample::parse(emotion.id(), &pixel_string(value)).expect("builder row must parse")
}

/// A detection covering every schema category with the same score.
#[must_use]
pub fn full_blendshapes(score: f32) -> FaceBlendshapes {
    FaceBlendshapes::from_scores(&[score; 52])
}

/// Deterministic pseudo-scores for one feature row.
///
/// Varies with both the row index and the column so distinct rows are
/// distinguishable without a RNG.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn synthetic_scores(row: usize) -> Vec<f32> {
    (0..BLENDSHAPE_NAMES.len())
        .map(|col| ((row * 31 + col * 7) % 100) as f32 / 100.0)
        .collect()
}

/// Feature-CSV text with the full 52-column schema and the given labels.
///
/// Matches the extractor's output format: sorted blendshape columns, then
/// `emotion_label_id`, then `emotion_name`. Pass an empty slice for a
/// header-only (empty) table.
#[must_use]
pub fn feature_csv_text(labels: &[Emotion]) -> String {
    let mut text = String::new();
    text.push_str(&BLENDSHAPE_NAMES.join(","));
    text.push_str(",emotion_label_id,emotion_name\n");

    for (row, emotion) in labels.iter().enumerate() {
        let scores: Vec<String> = synthetic_scores(row).iter().map(f32::to_string).collect();
        text.push_str(&scores.join(","));
        text.push_str(&format!(",{},{}\n", emotion.id(), emotion.name()));
    }

    text
}
