//! Feature sink port for writing the output table.

use crate::domain::FeatureRow;

/// Port for writing extracted feature rows.
///
/// Implementations must defer creating any output until the first row, so
/// a run that extracts nothing leaves the filesystem untouched.
pub trait FeatureSink: Send {
    /// Writes a single feature row.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&mut self, row: &FeatureRow) -> anyhow::Result<()>;

    /// Flushes and finalizes the output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> anyhow::Result<()>;
}
