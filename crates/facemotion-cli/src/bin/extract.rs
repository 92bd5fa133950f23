//! Stage 1: extract blendshape features from the FER2013 dataset.
//!
//! Reads `fer2013.csv` from the working directory, runs the face
//! landmarker over every row, and writes the feature table next to it.

use anyhow::Result;
use facemotion_adapters::{require_asset, FeatureCsvWriter, FerCsvSource};
use facemotion_cli::progress::ConsoleProgress;
use facemotion_cli::{init_logging, params};
use facemotion_core::inference::{get_device, FaceLandmarker};
use facemotion_core::{extract_features, ExtractionConfig, SampleSource};
use tracing::{info, warn};

fn main() -> std::process::ExitCode {
    init_logging();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let source = FerCsvSource::open(params::DATASET_FILE)?;
    info!(
        "Loaded {} with {} rows",
        params::DATASET_FILE,
        source.count_hint().unwrap_or(0)
    );

    require_asset(params::LANDMARKER_FILE)?;
    let device = get_device();
    let landmarker = FaceLandmarker::load(params::LANDMARKER_FILE, &device)?;

    let mut sink = FeatureCsvWriter::new(params::FEATURES_FILE);
    let progress = ConsoleProgress::new(source.count_hint());
    let config = ExtractionConfig {
        row_limit: params::ROW_LIMIT,
    };

    let outcome = extract_features(&source, &landmarker, &mut sink, &progress, &config)?;

    info!(
        "Extracted {} of {} rows ({} skipped, no face detected)",
        outcome.extracted, outcome.total, outcome.skipped
    );
    if outcome.extracted == 0 {
        warn!(
            "No faces detected in any row; {} was not created",
            params::FEATURES_FILE
        );
    } else {
        info!("Feature table written to {}", params::FEATURES_FILE);
    }

    Ok(())
}
