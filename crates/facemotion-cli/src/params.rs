//! Fixed pipeline parameters.
//!
//! Both stages read and write well-known file names in the working
//! directory rather than taking arguments.

/// FER2013 dataset CSV consumed by the extractor.
pub const DATASET_FILE: &str = "fer2013.csv";

/// Feature table written by the extractor and read by the trainer.
pub const FEATURES_FILE: &str = "fer2013_blendshape_features.csv";

/// Face landmarker weights bundle consumed by the extractor.
pub const LANDMARKER_FILE: &str = "face_landmarker.safetensors";

/// Classifier weights written by the trainer.
pub const CLASSIFIER_FILE: &str = "emotion_classifier.safetensors";

/// Optional cap on extracted rows; `None` processes the whole dataset.
pub const ROW_LIMIT: Option<usize> = None;

/// Log one progress line per this many rows when no terminal is attached.
pub const PROGRESS_INTERVAL: usize = 100;

/// Fraction of rows held out as the test partition.
pub const TEST_FRACTION: f32 = 0.2;

/// Seed shared by the split and the training shuffle.
pub const SEED: u64 = 42;

/// Default tracing filter when `RUST_LOG` is unset.
pub const LOG_FILTER: &str = "info";
