//! Anchor-based face detector.
//!
//! A BlazeFace-style detector: depthwise-separable residual blocks over a
//! 128x128 input with two detection heads (16x16 and 8x8 feature maps,
//! 896 anchors total). Overlapping candidates are merged by score-weighted
//! box blending rather than hard suppression, matching the behavior of the
//! landmarker pipeline the weights were converted from.

// Allow common ML code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

/// Input image size for the detector.
pub const INPUT_SIZE: usize = 128;

/// Number of anchor boxes (detections).
const NUM_ANCHORS: usize = 896;

/// Confidence threshold for face detection.
const SCORE_THRESHOLD: f32 = 0.5;

/// Minimum IoU for two candidates to be blended.
const BLEND_THRESHOLD: f32 = 0.3;

/// Values regressed per anchor. The first four are the box; the remaining
/// channels carry coarse keypoints that the mesh regressor supersedes.
const REGRESSOR_CHANNELS: usize = 16;

/// A detected face.
#[derive(Debug, Clone)]
pub struct FaceDetection {
    /// Face bounding box `[x_min, y_min, x_max, y_max]` in normalized `[0,1]` coordinates.
    pub bbox: [f32; 4],
    /// Detection confidence score.
    pub score: f32,
}

/// Depthwise-separable residual block.
///
/// Uses biased convolutions (BatchNorm folded in) to match the converted
/// pretrained weights.
struct DetectorBlock {
    depthwise: Conv2d,
    pointwise: Conv2d,
    channel_pad: usize,
    stride: usize,
}

impl DetectorBlock {
    fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        vb: &VarBuilder,
    ) -> Result<Self> {
        let padding = if stride == 2 {
            0
        } else {
            (kernel_size - 1) / 2
        };

        let depthwise = conv2d(
            in_channels,
            in_channels,
            kernel_size,
            Conv2dConfig {
                stride,
                padding,
                groups: in_channels,
                dilation: 1,
            },
            vb.pp("depthwise"),
        )?;

        let pointwise = conv2d(
            in_channels,
            out_channels,
            1,
            Conv2dConfig::default(),
            vb.pp("pointwise"),
        )?;

        let channel_pad = out_channels.saturating_sub(in_channels);

        Ok(Self {
            depthwise,
            pointwise,
            channel_pad,
            stride,
        })
    }
}

impl Module for DetectorBlock {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        // Asymmetric padding for stride-2 blocks
        let x_padded = if self.stride == 2 {
            x.pad_with_zeros(2, 0, 2)?.pad_with_zeros(3, 0, 2)?
        } else {
            x.clone()
        };

        let h = self.depthwise.forward(&x_padded)?;
        let h = h.relu()?;
        let h = self.pointwise.forward(&h)?;

        // Residual path: max pool for spatial downsampling, zero-pad channels
        let residual = if self.stride == 2 {
            x.max_pool2d(2)?
        } else {
            x.clone()
        };
        let residual = if self.channel_pad > 0 {
            residual.pad_with_zeros(1, 0, self.channel_pad)?
        } else {
            residual
        };

        (h + residual)?.relu()
    }
}

/// Face detector over 128x128 RGB inputs.
pub struct FaceDetector {
    conv0: Conv2d,

    // Backbone 1 (produces the 16x16 feature map)
    backbone1: Vec<DetectorBlock>,

    // Backbone 2 (produces the 8x8 feature map)
    backbone2: Vec<DetectorBlock>,

    // Detection heads for 16x16
    classifier_16: Conv2d,
    regressor_16: Conv2d,

    // Detection heads for 8x8
    classifier_8: Conv2d,
    regressor_8: Conv2d,

    anchors: Tensor,

    device: Device,
}

impl FaceDetector {
    /// Creates the detector from a `detector.`-prefixed `VarBuilder`.
    ///
    /// # Errors
    ///
    /// Returns an error if weights are missing or have wrong shapes.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let device = vb.device().clone();

        // Initial 5x5 conv: 3 -> 24 channels, stride 2
        let conv0 = conv2d(
            3,
            24,
            5,
            Conv2dConfig {
                stride: 2,
                padding: 0,
                ..Conv2dConfig::default()
            },
            vb.pp("conv0"),
        )?;

        // Two stride-2 blocks reduce the 64x64 post-conv0 map to 16x16
        let backbone1_config = [
            (24, 24, 3, 1),
            (24, 28, 3, 1),
            (28, 32, 3, 2),
            (32, 36, 3, 1),
            (36, 42, 3, 1),
            (42, 48, 3, 2),
            (48, 56, 3, 1),
            (56, 64, 3, 1),
            (64, 72, 3, 1),
            (72, 80, 3, 1),
            (80, 88, 3, 1),
        ];

        let mut backbone1 = Vec::new();
        for (i, (in_c, out_c, k, s)) in backbone1_config.iter().enumerate() {
            let block = DetectorBlock::new(*in_c, *out_c, *k, *s, &vb.pp(format!("backbone1.{i}")))?;
            backbone1.push(block);
        }

        let backbone2_config = [
            (88, 96, 3, 2),
            (96, 96, 3, 1),
            (96, 96, 3, 1),
            (96, 96, 3, 1),
            (96, 96, 3, 1),
        ];

        let mut backbone2 = Vec::new();
        for (i, (in_c, out_c, k, s)) in backbone2_config.iter().enumerate() {
            let block = DetectorBlock::new(*in_c, *out_c, *k, *s, &vb.pp(format!("backbone2.{i}")))?;
            backbone2.push(block);
        }

        // 16x16: 2 anchors per location = 512; 8x8: 6 per location = 384
        let classifier_16 = conv2d(88, 2, 1, Conv2dConfig::default(), vb.pp("classifier_16"))?;
        let regressor_16 = conv2d(
            88,
            2 * REGRESSOR_CHANNELS,
            1,
            Conv2dConfig::default(),
            vb.pp("regressor_16"),
        )?;

        let classifier_8 = conv2d(96, 6, 1, Conv2dConfig::default(), vb.pp("classifier_8"))?;
        let regressor_8 = conv2d(
            96,
            6 * REGRESSOR_CHANNELS,
            1,
            Conv2dConfig::default(),
            vb.pp("regressor_8"),
        )?;

        let anchors = Self::generate_anchors(&device)?;

        Ok(Self {
            conv0,
            backbone1,
            backbone2,
            classifier_16,
            regressor_16,
            classifier_8,
            regressor_8,
            anchors,
            device,
        })
    }

    /// Generates anchor boxes for the two feature map scales.
    fn generate_anchors(device: &Device) -> Result<Tensor> {
        let mut anchors = Vec::with_capacity(NUM_ANCHORS * 4);

        for y in 0..16_u8 {
            for x in 0..16_u8 {
                for _ in 0..2 {
                    let cx = (f32::from(x) + 0.5) / 16.0;
                    let cy = (f32::from(y) + 0.5) / 16.0;
                    anchors.extend_from_slice(&[cx, cy, 1.0, 1.0]);
                }
            }
        }

        for y in 0..8_u8 {
            for x in 0..8_u8 {
                for _ in 0..6 {
                    let cx = (f32::from(x) + 0.5) / 8.0;
                    let cy = (f32::from(y) + 0.5) / 8.0;
                    anchors.extend_from_slice(&[cx, cy, 1.0, 1.0]);
                }
            }
        }

        Tensor::from_vec(anchors, (NUM_ANCHORS, 4), device)
            .context("Failed to create anchors tensor")
    }

    /// Preprocesses an image for detection.
    ///
    /// # Returns
    /// Tensor of shape (1, 3, 128, 128) normalized to `[-1, 1]`
    ///
    /// # Errors
    ///
    /// Returns an error if tensor creation fails.
    pub fn preprocess(&self, image: &image::DynamicImage) -> Result<Tensor> {
        let resized = image.resize_exact(
            INPUT_SIZE as u32,
            INPUT_SIZE as u32,
            image::imageops::FilterType::Lanczos3,
        );
        let rgb = resized.to_rgb8();

        let data: Vec<f32> = rgb
            .pixels()
            .flat_map(|p| {
                [
                    (f32::from(p[0]) / 127.5) - 1.0,
                    (f32::from(p[1]) / 127.5) - 1.0,
                    (f32::from(p[2]) / 127.5) - 1.0,
                ]
            })
            .collect();

        // NHWC buffer -> NCHW tensor
        let tensor = Tensor::from_vec(data, (1, INPUT_SIZE, INPUT_SIZE, 3), &self.device)?;
        tensor
            .permute((0, 3, 1, 2))?
            .to_dtype(DType::F32)
            .context("Failed to preprocess image")
    }

    /// Runs the network on a preprocessed input tensor.
    fn forward(&self, x: &Tensor) -> Result<(Tensor, Tensor)> {
        let x = x.pad_with_zeros(2, 1, 2)?.pad_with_zeros(3, 1, 2)?;
        let x = self.conv0.forward(&x)?;
        let x = x.relu()?;

        let mut h = x;
        for block in &self.backbone1 {
            h = block.forward(&h)?;
        }
        let feature_16 = h.clone();

        for block in &self.backbone2 {
            h = block.forward(&h)?;
        }
        let feature_8 = h;

        let c1 = self.classifier_16.forward(&feature_16)?;
        let c1 = c1.permute((0, 2, 3, 1))?.reshape((1, 512, 1))?;

        let r1 = self.regressor_16.forward(&feature_16)?;
        let r1 = r1
            .permute((0, 2, 3, 1))?
            .reshape((1, 512, REGRESSOR_CHANNELS))?;

        let c2 = self.classifier_8.forward(&feature_8)?;
        let c2 = c2.permute((0, 2, 3, 1))?.reshape((1, 384, 1))?;

        let r2 = self.regressor_8.forward(&feature_8)?;
        let r2 = r2
            .permute((0, 2, 3, 1))?
            .reshape((1, 384, REGRESSOR_CHANNELS))?;

        let scores = Tensor::cat(&[c1, c2], 1)?;
        let boxes = Tensor::cat(&[r1, r2], 1)?;

        Ok((scores, boxes))
    }

    /// Detects faces in an image.
    ///
    /// # Returns
    /// Detections sorted by descending score. Empty if no anchor clears
    /// the confidence threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&self, image: &image::DynamicImage) -> Result<Vec<FaceDetection>> {
        let input = self.preprocess(image)?;
        let (scores, boxes) = self.forward(&input)?;

        self.decode_detections(&scores, &boxes)
    }

    /// Decodes raw network output into face detections.
    fn decode_detections(&self, scores: &Tensor, boxes: &Tensor) -> Result<Vec<FaceDetection>> {
        let scores = scores.squeeze(0)?.to_vec2::<f32>()?;
        let boxes = boxes.squeeze(0)?.to_vec2::<f32>()?;
        let anchors = self.anchors.to_vec2::<f32>()?;

        let mut candidates = Vec::new();
        let input_size_f32 = INPUT_SIZE as f32;

        for i in 0..NUM_ANCHORS {
            let score = sigmoid(scores[i][0]);

            if score < SCORE_THRESHOLD {
                continue;
            }

            let anchor = &anchors[i];
            let box_data = &boxes[i];

            // Decode bounding box (center format -> corner format)
            let cx = anchor[0] + box_data[0] / input_size_f32;
            let cy = anchor[1] + box_data[1] / input_size_f32;
            let w = box_data[2] / input_size_f32;
            let h = box_data[3] / input_size_f32;

            let x_min = (cx - w / 2.0).clamp(0.0, 1.0);
            let y_min = (cy - h / 2.0).clamp(0.0, 1.0);
            let x_max = (cx + w / 2.0).clamp(0.0, 1.0);
            let y_max = (cy + h / 2.0).clamp(0.0, 1.0);

            candidates.push(FaceDetection {
                bbox: [x_min, y_min, x_max, y_max],
                score,
            });
        }

        Ok(blend_overlapping(candidates))
    }
}

/// Merges overlapping candidates by score-weighted box blending.
///
/// Candidates are grouped greedily around the highest-scoring remaining
/// detection; each group collapses to one box whose coordinates are the
/// score-weighted average of its members.
fn blend_overlapping(mut candidates: Vec<FaceDetection>) -> Vec<FaceDetection> {
    // Sort by score descending (NaN scores treated as equal)
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut merged = Vec::new();

    while !candidates.is_empty() {
        let top = candidates.remove(0);
        let (group, rest): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|other| iou(&top.bbox, &other.bbox) >= BLEND_THRESHOLD);
        candidates = rest;

        let mut bbox = [0.0f32; 4];
        let mut weight_sum = 0.0f32;
        for det in std::iter::once(&top).chain(group.iter()) {
            for (acc, coord) in bbox.iter_mut().zip(det.bbox) {
                *acc += coord * det.score;
            }
            weight_sum += det.score;
        }
        for coord in &mut bbox {
            *coord /= weight_sum;
        }

        merged.push(FaceDetection {
            bbox,
            score: top.score,
        });
    }

    merged
}

/// Scalar sigmoid, applied to anchor scores and the mesh presence logit.
#[inline]
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Intersection over Union for two bounding boxes.
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);

    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_range() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = [0.0, 0.0, 0.5, 0.5];
        let b = [0.6, 0.6, 1.0, 1.0];
        assert!((iou(&a, &b) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_full_overlap() {
        let a = [0.0, 0.0, 1.0, 1.0];
        let b = [0.0, 0.0, 1.0, 1.0];
        assert!((iou(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = [0.0, 0.0, 0.5, 0.5];
        let b = [0.25, 0.25, 0.75, 0.75];
        // Intersection: 0.25 * 0.25 = 0.0625
        // Union: 0.25 + 0.25 - 0.0625 = 0.4375
        let expected = 0.0625 / 0.4375;
        assert!((iou(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_blend_merges_overlapping() {
        let candidates = vec![
            FaceDetection {
                bbox: [0.0, 0.0, 0.5, 0.5],
                score: 0.9,
            },
            FaceDetection {
                bbox: [0.1, 0.1, 0.6, 0.6],
                score: 0.6,
            },
        ];

        let merged = blend_overlapping(candidates);
        assert_eq!(merged.len(), 1);
        assert!((merged[0].score - 0.9).abs() < 1e-6);

        // Weighted average pulls the box toward the stronger candidate.
        let expected_x_min = 0.1 * 0.6 / 1.5;
        assert!((merged[0].bbox[0] - expected_x_min).abs() < 1e-5);
    }

    #[test]
    fn test_blend_keeps_disjoint_faces() {
        let candidates = vec![
            FaceDetection {
                bbox: [0.0, 0.0, 0.3, 0.3],
                score: 0.8,
            },
            FaceDetection {
                bbox: [0.6, 0.6, 0.9, 0.9],
                score: 0.7,
            },
        ];

        let merged = blend_overlapping(candidates);
        assert_eq!(merged.len(), 2);
        // Order is by descending score.
        assert!(merged[0].score >= merged[1].score);
    }
}
