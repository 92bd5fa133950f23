//! Facemotion Adapters - CSV dataset input and feature-table I/O
//!
//! Implements the core ports against the filesystem: a streaming FER2013
//! CSV source, a deferred-creation feature CSV writer, and the feature
//! table reader used by the trainer.

pub mod assets;
pub mod fer_csv;
pub mod feature_csv;

pub use assets::require_asset;
pub use fer_csv::FerCsvSource;
pub use feature_csv::{read_feature_table, FeatureCsvWriter};
