//! A fixed-schema output feature row.

use std::collections::HashMap;

use super::{Emotion, FaceBlendshapes, BLENDSHAPE_NAMES};

/// One row of the output feature table: the 52 blendshape scores in schema
/// order, plus the emotion label.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Scores in [`BLENDSHAPE_NAMES`] order.
    pub scores: Vec<f32>,
    /// Emotion label for this row.
    pub emotion: Emotion,
}

impl FeatureRow {
    /// Maps detected categories onto the fixed schema by name.
    ///
    /// Categories the detector did not report default to 0.0; categories
    /// outside the schema are ignored.
    #[must_use]
    pub fn from_blendshapes(face: &FaceBlendshapes, emotion: Emotion) -> Self {
        let by_name: HashMap<&str, f32> = face
            .categories
            .iter()
            .map(|c| (c.name.as_str(), c.score))
            .collect();

        let scores = BLENDSHAPE_NAMES
            .iter()
            .map(|name| by_name.get(name).copied().unwrap_or(0.0))
            .collect();

        Self { scores, emotion }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlendshapeScore;

    #[test]
    fn test_full_detection_maps_in_order() {
        let scores: Vec<f32> = (0..52).map(|i| i as f32 / 100.0).collect();
        let face = FaceBlendshapes::from_scores(&scores);

        let row = FeatureRow::from_blendshapes(&face, Emotion::Sad);
        assert_eq!(row.scores, scores);
        assert_eq!(row.emotion, Emotion::Sad);
    }

    #[test]
    fn test_missing_categories_default_to_zero() {
        let face = FaceBlendshapes {
            categories: vec![BlendshapeScore {
                name: "jawOpen".to_string(),
                score: 0.9,
            }],
        };

        let row = FeatureRow::from_blendshapes(&face, Emotion::Surprise);
        assert_eq!(row.scores.len(), 52);

        let jaw_open = BLENDSHAPE_NAMES
            .iter()
            .position(|&n| n == "jawOpen")
            .unwrap_or(0);
        assert!((row.scores[jaw_open] - 0.9).abs() < 1e-6);
        assert_eq!(row.scores.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn test_unknown_categories_ignored() {
        let face = FaceBlendshapes {
            categories: vec![BlendshapeScore {
                name: "notABlendshape".to_string(),
                score: 1.0,
            }],
        };

        let row = FeatureRow::from_blendshapes(&face, Emotion::Angry);
        assert!(row.scores.iter().all(|&s| s == 0.0));
    }
}
