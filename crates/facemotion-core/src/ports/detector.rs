//! Face blendshape detector port.

use crate::domain::FaceBlendshapes;

/// Port for the face-landmark model that turns an image into per-face
/// blendshape scores.
///
/// The production implementation is the candle face-landmarker stack; tests
/// substitute mocks.
pub trait BlendshapeDetector: Send + Sync {
    /// Detects faces and scores their blendshapes.
    ///
    /// Results are ordered by descending detection confidence, so index 0
    /// is the most confident face. An empty vector means no face was found
    /// and the image should be skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn detect(&self, image: &image::DynamicImage) -> anyhow::Result<Vec<FaceBlendshapes>>;
}
