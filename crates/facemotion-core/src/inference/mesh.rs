//! Face-mesh landmark regressor.
//!
//! A small CNN over a 192x192 crop of the detector ROI, regressing 468
//! mesh landmarks plus a face-presence logit. Crops whose presence
//! probability falls below the threshold are discarded upstream.

// Allow common ML/image code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use super::sigmoid;

/// Input crop size for the mesh regressor.
pub const MESH_INPUT: usize = 192;

/// Number of regressed mesh landmarks.
pub const NUM_LANDMARKS: usize = 468;

/// The detector box is square-expanded by this fraction before cropping.
const ROI_EXPANSION: f32 = 0.25;

/// Minimum face-presence probability for a crop to count as a face.
const PRESENCE_THRESHOLD: f32 = 0.5;

/// Regressed mesh for one face crop.
#[derive(Debug, Clone)]
pub struct FaceMesh {
    /// Landmark `[x, y]` positions normalized to the crop, `[0, 1]`.
    pub landmarks: Vec<[f32; 2]>,
    /// Face-presence probability for the crop.
    pub presence: f32,
}

/// Mesh landmark regressor.
///
/// Architecture: 5 stride-2 conv layers (192 -> 6 spatial), a shared FC
/// trunk, and two heads (landmark coordinates, presence logit).
pub struct MeshRegressor {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    conv4: Conv2d,
    conv5: Conv2d,
    fc: Linear,
    landmarks: Linear,
    presence: Linear,
    device: Device,
}

impl MeshRegressor {
    /// Creates the regressor from a `mesh.`-prefixed `VarBuilder`.
    ///
    /// # Errors
    ///
    /// Returns an error if weights are missing or have wrong shapes.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let device = vb.device().clone();

        let stride2 = Conv2dConfig {
            stride: 2,
            padding: 1,
            ..Conv2dConfig::default()
        };

        let conv1 = conv2d(3, 16, 3, stride2, vb.pp("conv1"))?;
        let conv2 = conv2d(16, 32, 3, stride2, vb.pp("conv2"))?;
        let conv3 = conv2d(32, 64, 3, stride2, vb.pp("conv3"))?;
        let conv4 = conv2d(64, 128, 3, stride2, vb.pp("conv4"))?;
        let conv5 = conv2d(128, 256, 3, stride2, vb.pp("conv5"))?;

        // 192 -> 96 -> 48 -> 24 -> 12 -> 6; flattened: 256 * 6 * 6 = 9216
        let fc = linear(9216, 512, vb.pp("fc"))?;
        let landmarks = linear(512, NUM_LANDMARKS * 2, vb.pp("landmarks"))?;
        let presence = linear(512, 1, vb.pp("presence"))?;

        Ok(Self {
            conv1,
            conv2,
            conv3,
            conv4,
            conv5,
            fc,
            landmarks,
            presence,
            device,
        })
    }

    /// Regresses the mesh for one detector ROI.
    ///
    /// # Returns
    /// `None` when the crop fails the presence check.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn regress(
        &self,
        image: &image::DynamicImage,
        bbox: &[f32; 4],
    ) -> Result<Option<FaceMesh>> {
        let crop = crop_roi(image, bbox);
        let input = self.preprocess(&crop)?;

        let trunk = self.forward_trunk(&input)?;

        let presence_logit = self
            .presence
            .forward(&trunk)?
            .squeeze(0)?
            .squeeze(0)?
            .to_scalar::<f32>()?;
        let presence = sigmoid(presence_logit);

        if presence < PRESENCE_THRESHOLD {
            return Ok(None);
        }

        let coords = self
            .landmarks
            .forward(&trunk)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        let landmarks = coords
            .chunks_exact(2)
            .map(|xy| [xy[0], xy[1]])
            .collect();

        Ok(Some(FaceMesh {
            landmarks,
            presence,
        }))
    }

    /// Preprocesses a crop for the regressor.
    ///
    /// # Returns
    /// Tensor of shape (1, 3, 192, 192) normalized to `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns an error if tensor creation fails.
    fn preprocess(&self, crop: &image::DynamicImage) -> Result<Tensor> {
        let resized = crop.resize_exact(
            MESH_INPUT as u32,
            MESH_INPUT as u32,
            image::imageops::FilterType::Lanczos3,
        );
        let rgb = resized.to_rgb8();

        let data: Vec<f32> = rgb
            .pixels()
            .flat_map(|p| {
                [
                    f32::from(p[0]) / 255.0,
                    f32::from(p[1]) / 255.0,
                    f32::from(p[2]) / 255.0,
                ]
            })
            .collect();

        let tensor = Tensor::from_vec(data, (1, MESH_INPUT, MESH_INPUT, 3), &self.device)?;
        tensor
            .permute((0, 3, 1, 2))
            .context("Failed to preprocess mesh crop")
    }

    fn forward_trunk(&self, x: &Tensor) -> Result<Tensor> {
        let x = self.conv1.forward(x)?.relu()?;
        let x = self.conv2.forward(&x)?.relu()?;
        let x = self.conv3.forward(&x)?.relu()?;
        let x = self.conv4.forward(&x)?.relu()?;
        let x = self.conv5.forward(&x)?.relu()?;

        let x = x.flatten_from(1)?;
        Ok(self.fc.forward(&x)?.relu()?)
    }
}

/// Crops the detector ROI, square-expanded and clamped to the frame.
fn crop_roi(image: &image::DynamicImage, bbox: &[f32; 4]) -> image::DynamicImage {
    let img_w = image.width() as f32;
    let img_h = image.height() as f32;

    let (x, y, side) = expand_roi(bbox, img_w, img_h);

    let pw = side.max(1.0) as u32;
    let ph = side.max(1.0) as u32;
    let px = (x as u32).min(image.width().saturating_sub(1));
    let py = (y as u32).min(image.height().saturating_sub(1));
    let pw = pw.min(image.width() - px).max(1);
    let ph = ph.min(image.height() - py).max(1);

    image.crop_imm(px, py, pw, ph)
}

/// Computes the expanded square crop `(x, y, side)` in pixel coordinates.
fn expand_roi(bbox: &[f32; 4], img_w: f32, img_h: f32) -> (f32, f32, f32) {
    let w = (bbox[2] - bbox[0]) * img_w;
    let h = (bbox[3] - bbox[1]) * img_h;
    let cx = (bbox[0] + bbox[2]) / 2.0 * img_w;
    let cy = (bbox[1] + bbox[3]) / 2.0 * img_h;

    let side = (w.max(h) * (1.0 + ROI_EXPANSION)).min(img_w.min(img_h));
    let x = (cx - side / 2.0).clamp(0.0, img_w - side);
    let y = (cy - side / 2.0).clamp(0.0, img_h - side);

    (x, y, side)
}
