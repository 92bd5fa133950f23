//! Stage-1 feature extraction pipeline.
//!
//! Streams dataset rows through the detector and writes one fixed-schema
//! feature row per image with a detected face. Rows with no face are
//! counted and skipped; every other failure is fatal.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::FeatureRow;
use crate::ports::{BlendshapeDetector, FeatureSink, ProgressEvent, ProgressSink, SampleSource};

/// Extraction parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionConfig {
    /// Caps the number of extracted (face-found) rows; `None` processes
    /// the whole dataset. Useful for smoke runs.
    pub row_limit: Option<usize>,
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOutcome {
    /// Rows read from the source.
    pub total: usize,
    /// Rows with a detected face and an emitted feature row.
    pub extracted: usize,
    /// Rows skipped because no face was detected.
    pub skipped: usize,
}

/// Runs the extraction pipeline.
///
/// For each sample: decode the image, run the detector, and write a
/// feature row for the first (most confident) face. Output order equals
/// input order; the sink never sees a row for a skipped sample.
///
/// # Errors
///
/// Returns an error on malformed source rows, detector failures, or sink
/// failures. No-face images are not errors.
pub fn extract_features(
    source: &dyn SampleSource,
    detector: &dyn BlendshapeDetector,
    sink: &mut dyn FeatureSink,
    progress: &dyn ProgressSink,
    config: &ExtractionConfig,
) -> Result<ExtractionOutcome> {
    let total_hint = source.count_hint();
    let mut total = 0usize;
    let mut extracted = 0usize;
    let mut skipped = 0usize;

    for (index, sample) in source.samples().enumerate() {
        if config.row_limit.is_some_and(|limit| extracted >= limit) {
            info!("Row limit of {} extracted rows reached", extracted);
            break;
        }

        let sample = sample.with_context(|| format!("Failed to read dataset row {index}"))?;
        total += 1;

        progress.on_event(ProgressEvent::Started {
            index,
            total: total_hint,
        });

        let image = image::DynamicImage::ImageLuma8(sample.to_image());
        let faces = detector
            .detect(&image)
            .with_context(|| format!("Detection failed on row {index}"))?;

        // Multi-face images are not supported; only the most confident
        // face contributes.
        match faces.first() {
            Some(face) => {
                let row = FeatureRow::from_blendshapes(face, sample.emotion);
                sink.write(&row)
                    .with_context(|| format!("Failed to write feature row for row {index}"))?;
                extracted += 1;
                progress.on_event(ProgressEvent::Completed { index });
            }
            None => {
                debug!("No face detected in row {index} ({})", sample.emotion);
                skipped += 1;
                progress.on_event(ProgressEvent::Skipped { index });
            }
        }
    }

    sink.finish().context("Failed to finalize feature output")?;

    progress.on_event(ProgressEvent::Finished {
        processed: extracted,
        skipped,
    });

    Ok(ExtractionOutcome {
        total,
        extracted,
        skipped,
    })
}
