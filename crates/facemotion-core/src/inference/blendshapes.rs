//! Blendshape scoring head.
//!
//! An MLP over the mesh landmark positions producing the 52 category
//! scores in [`crate::domain::BLENDSHAPE_NAMES`] order.

use anyhow::{ensure, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

use super::mesh::{FaceMesh, NUM_LANDMARKS};
use crate::domain::BLENDSHAPE_NAMES;

/// Blendshape head: 936 landmark coordinates -> 52 sigmoid scores.
pub struct BlendshapeHead {
    fc1: Linear,
    fc2: Linear,
    out: Linear,
    device: Device,
}

impl BlendshapeHead {
    /// Creates the head from a `blendshapes.`-prefixed `VarBuilder`.
    ///
    /// # Errors
    ///
    /// Returns an error if weights are missing or have wrong shapes.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let device = vb.device().clone();

        let fc1 = linear(NUM_LANDMARKS * 2, 256, vb.pp("fc1"))?;
        let fc2 = linear(256, 128, vb.pp("fc2"))?;
        let out = linear(128, BLENDSHAPE_NAMES.len(), vb.pp("out"))?;

        Ok(Self {
            fc1,
            fc2,
            out,
            device,
        })
    }

    /// Scores the 52 blendshape categories for one mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has the wrong landmark count or
    /// inference fails.
    pub fn score(&self, mesh: &FaceMesh) -> Result<Vec<f32>> {
        ensure!(
            mesh.landmarks.len() == NUM_LANDMARKS,
            "expected {NUM_LANDMARKS} landmarks, got {}",
            mesh.landmarks.len()
        );

        let coords = flatten_landmarks(&mesh.landmarks);
        let input = Tensor::from_vec(coords, (1, NUM_LANDMARKS * 2), &self.device)?;

        let x = self.fc1.forward(&input)?.relu()?;
        let x = self.fc2.forward(&x)?.relu()?;
        let logits = self.out.forward(&x)?;

        let scores = candle_nn::ops::sigmoid(&logits)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        Ok(scores)
    }
}

/// Interleaves landmark positions as `[x0, y0, x1, y1, ...]`.
fn flatten_landmarks(landmarks: &[[f32; 2]]) -> Vec<f32> {
    landmarks.iter().flat_map(|&[x, y]| [x, y]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_landmarks_interleaves() {
        let flat = flatten_landmarks(&[[0.1, 0.2], [0.3, 0.4]]);
        assert_eq!(flat, vec![0.1, 0.2, 0.3, 0.4]);
    }
}
