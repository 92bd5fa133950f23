//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external
//! adapters: the dataset source, the opaque face-landmark detector, the
//! feature-table sink, and progress reporting.

mod detector;
mod feature_sink;
mod progress;
mod sample_source;

pub use detector::BlendshapeDetector;
pub use feature_sink::FeatureSink;
pub use progress::{NullProgress, ProgressEvent, ProgressSink};
pub use sample_source::SampleSource;
