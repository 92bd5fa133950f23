//! Test support utilities for facemotion.
//!
//! Provides synthetic-data builders and mock implementations of the core
//! ports for testing the extraction and training pipelines.
//!
//! # Example
//!
//! ```
//! use facemotion_core::Emotion;
//! use facemotion_test_support::{full_blendshapes, sample_with_value, MockDetector, MockSampleSource};
//!
//! let source = MockSampleSource::new(vec![sample_with_value(Emotion::Happy, 128)]);
//! let detector = MockDetector::always(vec![full_blendshapes(0.5)]);
//! ```

mod builders;
mod mocks;

pub use builders::{
    feature_csv_text, full_blendshapes, pixel_string, sample_with_value, synthetic_scores,
};
pub use mocks::{MockDetector, MockFeatureSink, MockProgressSink, MockSampleSource};
