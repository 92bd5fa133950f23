//! Facemotion Core - Domain logic, inference, and training
//!
//! This crate contains the core domain types, the candle face landmarker
//! stack used for blendshape extraction, the stage-1 extraction pipeline,
//! and the stage-2 classifier training loop.

pub mod domain;
pub mod extraction;
pub mod inference;
pub mod ports;
pub mod training;

pub use domain::{
    BlendshapeScore, Emotion, FaceBlendshapes, FeatureRow, PixelSample, BLENDSHAPE_NAMES,
};
pub use extraction::{extract_features, ExtractionConfig, ExtractionOutcome};
pub use ports::{BlendshapeDetector, FeatureSink, ProgressEvent, ProgressSink, SampleSource};
