//! Progress reporting port for UI integration.

/// Events emitted during extraction for progress tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Processing started for a row.
    Started {
        /// Index in the dataset (0-based).
        index: usize,
        /// Total rows, if known.
        total: Option<usize>,
    },
    /// A feature row was extracted.
    Completed {
        /// Index in the dataset (0-based).
        index: usize,
    },
    /// A row was skipped because no face was detected.
    Skipped {
        /// Index in the dataset (0-based).
        index: usize,
    },
    /// All rows have been processed.
    Finished {
        /// Rows with an extracted feature row.
        processed: usize,
        /// Rows skipped (no face detected).
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// No-op progress sink for tests and quiet runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
