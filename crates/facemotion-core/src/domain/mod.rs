//! Core domain types for the FER2013 blendshape pipeline.

mod blendshapes;
mod emotion;
mod feature_row;
mod sample;

pub use blendshapes::{BlendshapeScore, FaceBlendshapes, BLENDSHAPE_NAMES};
pub use emotion::Emotion;
pub use feature_row::FeatureRow;
pub use sample::{PixelSample, IMAGE_SIZE, PIXELS_PER_IMAGE};
