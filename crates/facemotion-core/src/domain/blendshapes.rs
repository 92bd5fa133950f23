//! The fixed blendshape feature schema.
//!
//! The face landmarker emits 52 ARKit-style blendshape categories. The
//! schema is declared upfront rather than discovered from the first
//! detection, so the output column set never depends on which row happens
//! to be processed first. The array is stored in lexicographic order and
//! doubles as the feature-CSV column order.

/// The 52 blendshape category names, in lexicographic (= column) order.
pub const BLENDSHAPE_NAMES: [&str; 52] = [
    "_neutral",
    "browDownLeft",
    "browDownRight",
    "browInnerUp",
    "browOuterUpLeft",
    "browOuterUpRight",
    "cheekPuff",
    "cheekSquintLeft",
    "cheekSquintRight",
    "eyeBlinkLeft",
    "eyeBlinkRight",
    "eyeLookDownLeft",
    "eyeLookDownRight",
    "eyeLookInLeft",
    "eyeLookInRight",
    "eyeLookOutLeft",
    "eyeLookOutRight",
    "eyeLookUpLeft",
    "eyeLookUpRight",
    "eyeSquintLeft",
    "eyeSquintRight",
    "eyeWideLeft",
    "eyeWideRight",
    "jawForward",
    "jawLeft",
    "jawOpen",
    "jawRight",
    "mouthClose",
    "mouthDimpleLeft",
    "mouthDimpleRight",
    "mouthFrownLeft",
    "mouthFrownRight",
    "mouthFunnel",
    "mouthLeft",
    "mouthLowerDownLeft",
    "mouthLowerDownRight",
    "mouthPressLeft",
    "mouthPressRight",
    "mouthPucker",
    "mouthRight",
    "mouthRollLower",
    "mouthRollUpper",
    "mouthShrugLower",
    "mouthShrugUpper",
    "mouthSmileLeft",
    "mouthSmileRight",
    "mouthStretchLeft",
    "mouthStretchRight",
    "mouthUpperUpLeft",
    "mouthUpperUpRight",
    "noseSneerLeft",
    "noseSneerRight",
];

/// A single named blendshape intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendshapeScore {
    /// Category name as emitted by the landmarker.
    pub name: String,
    /// Intensity in `[0, 1]`.
    pub score: f32,
}

/// The blendshape categories detected for one face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceBlendshapes {
    /// Detected categories. Not required to cover the full schema.
    pub categories: Vec<BlendshapeScore>,
}

impl FaceBlendshapes {
    /// Builds a face result from scores in [`BLENDSHAPE_NAMES`] order.
    ///
    /// Scores beyond the schema length are dropped.
    #[must_use]
    pub fn from_scores(scores: &[f32]) -> Self {
        let categories = BLENDSHAPE_NAMES
            .iter()
            .zip(scores)
            .map(|(name, &score)| BlendshapeScore {
                name: (*name).to_string(),
                score,
            })
            .collect();
        Self { categories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_length() {
        assert_eq!(BLENDSHAPE_NAMES.len(), 52);
    }

    #[test]
    fn test_schema_is_sorted_and_unique() {
        for pair in BLENDSHAPE_NAMES.windows(2) {
            assert!(pair[0] < pair[1], "{} must sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_from_scores_pairs_names() {
        let scores: Vec<f32> = (0..52).map(|i| i as f32 / 52.0).collect();
        let face = FaceBlendshapes::from_scores(&scores);

        assert_eq!(face.categories.len(), 52);
        assert_eq!(face.categories[0].name, "_neutral");
        assert_eq!(face.categories[51].name, "noseSneerRight");
        assert!((face.categories[51].score - 51.0 / 52.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_scores_truncates_extras() {
        let face = FaceBlendshapes::from_scores(&[0.5; 60]);
        assert_eq!(face.categories.len(), 52);
    }
}
