//! Sample source port for streaming dataset rows.

use crate::domain::PixelSample;

/// Port for streaming labeled FER2013 samples.
pub trait SampleSource: Send + Sync {
    /// Returns an iterator over samples from this source.
    ///
    /// # Errors
    ///
    /// Individual items are errors if a row is malformed; malformed rows
    /// are fatal to the run.
    fn samples(&self) -> Box<dyn Iterator<Item = anyhow::Result<PixelSample>> + Send + '_>;

    /// Returns the total number of rows, if known.
    fn count_hint(&self) -> Option<usize>;
}
