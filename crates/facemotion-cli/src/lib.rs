//! Facemotion CLI - shared pieces of the extraction and training binaries.
//!
//! Both binaries run against fixed file names in the working directory,
//! mirroring how the pipeline is meant to be driven: drop `fer2013.csv`
//! and the weights bundle next to the binary and run the two stages in
//! order.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod params;
pub mod progress;

/// Initializes tracing for a pipeline binary.
///
/// Logs go to stderr so stdout stays clean for the classification report.
/// The filter is fixed at [`params::LOG_FILTER`]; like every other
/// parameter, changing it means editing the source.
pub fn init_logging() {
    let filter = EnvFilter::new(params::LOG_FILTER);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
