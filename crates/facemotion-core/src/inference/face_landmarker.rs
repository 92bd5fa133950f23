//! The composed face landmarker.
//!
//! Wires the detector, mesh regressor, and blendshape head together from a
//! single safetensors bundle and exposes them through the
//! [`BlendshapeDetector`] port.

use std::path::Path;

use anyhow::{Context, Result};
use candle_core::Device;
use tracing::debug;

use super::{load_safetensors, BlendshapeHead, FaceDetector, MeshRegressor};
use crate::domain::FaceBlendshapes;
use crate::ports::BlendshapeDetector;

/// Face landmarker: detector + mesh + blendshape head.
///
/// Loaded once at startup; the handle lives for the duration of the run.
pub struct FaceLandmarker {
    detector: FaceDetector,
    mesh: MeshRegressor,
    blendshapes: BlendshapeHead,
}

impl FaceLandmarker {
    /// Loads all three models from one safetensors bundle.
    ///
    /// Tensor names in the bundle are prefixed `detector.`, `mesh.`, and
    /// `blendshapes.`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the path if the bundle is missing or
    /// malformed. This is the extractor's fail-fast model-asset check.
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self> {
        let path = path.as_ref();
        let vb = load_safetensors(path, device)
            .with_context(|| format!("Failed to load face landmarker: {}", path.display()))?;

        let detector =
            FaceDetector::new(vb.pp("detector")).context("Failed to build face detector")?;
        let mesh = MeshRegressor::new(vb.pp("mesh")).context("Failed to build mesh regressor")?;
        let blendshapes =
            BlendshapeHead::new(vb.pp("blendshapes")).context("Failed to build blendshape head")?;

        debug!("Face landmarker loaded from {}", path.display());

        Ok(Self {
            detector,
            mesh,
            blendshapes,
        })
    }
}

impl BlendshapeDetector for FaceLandmarker {
    fn detect(&self, image: &image::DynamicImage) -> Result<Vec<FaceBlendshapes>> {
        let detections = self.detector.detect(image).context("Face detection failed")?;
        debug!("Found {} face candidates", detections.len());

        let mut faces = Vec::new();

        // Detections arrive sorted by score, so faces[0] is the most
        // confident face.
        for det in detections {
            let Some(mesh) = self
                .mesh
                .regress(image, &det.bbox)
                .context("Mesh regression failed")?
            else {
                debug!("Crop at {:?} failed the presence check", det.bbox);
                continue;
            };

            let scores = self
                .blendshapes
                .score(&mesh)
                .context("Blendshape scoring failed")?;
            faces.push(FaceBlendshapes::from_scores(&scores));
        }

        Ok(faces)
    }
}
