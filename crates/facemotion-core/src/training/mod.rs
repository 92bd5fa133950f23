//! Stage-2 classifier training.
//!
//! Dataset carriers, the deterministic stratified split, feature
//! standardization, the dense emotion classifier, its training loop, and
//! evaluation metrics.

mod dataset;
mod metrics;
mod model;
mod scaler;
mod split;
mod trainer;

pub use dataset::{FeatureMatrix, FeatureTable};
pub use metrics::{classification_report, confusion_matrix, ClassificationReport, ConfusionMatrix};
pub use model::EmotionClassifier;
pub use scaler::StandardScaler;
pub use split::stratified_split;
pub use trainer::{train, Evaluation, TrainedClassifier, TrainingConfig};
