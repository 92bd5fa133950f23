//! Feature table CSV adapter.
//!
//! The writer emits the fixed extraction schema: the 52 blendshape columns
//! in sorted order, then `emotion_label_id` and `emotion_name`. The reader
//! loads that file back for training.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use facemotion_core::domain::{Emotion, FeatureRow, BLENDSHAPE_NAMES};
use facemotion_core::ports::FeatureSink;
use facemotion_core::training::{FeatureMatrix, FeatureTable};
use tracing::debug;

/// Label columns appended after the blendshape scores.
const LABEL_ID_COLUMN: &str = "emotion_label_id";
const LABEL_NAME_COLUMN: &str = "emotion_name";

/// Feature sink writing the output CSV.
///
/// Creation of the file is deferred until the first row: a run that
/// extracts nothing leaves no output behind.
pub struct FeatureCsvWriter {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl FeatureCsvWriter {
    /// Prepares a writer targeting `path` without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    /// Whether any row has been written yet.
    #[must_use]
    pub const fn created(&self) -> bool {
        self.writer.is_some()
    }

    fn open_with_header(&mut self) -> Result<&mut csv::Writer<File>> {
        if self.writer.is_none() {
            let file = File::create(&self.path)
                .with_context(|| format!("failed to create {}", self.path.display()))?;
            let mut writer = csv::Writer::from_writer(file);

            let mut header: Vec<&str> = BLENDSHAPE_NAMES.to_vec();
            header.push(LABEL_ID_COLUMN);
            header.push(LABEL_NAME_COLUMN);
            writer
                .write_record(&header)
                .with_context(|| format!("failed to write {}", self.path.display()))?;

            debug!(path = %self.path.display(), "created feature table");
            self.writer = Some(writer);
        }

        // The branch above just filled it.
        self.writer
            .as_mut()
            .context("feature writer unavailable")
    }
}

impl FeatureSink for FeatureCsvWriter {
    fn write(&mut self, row: &FeatureRow) -> Result<()> {
        let path = self.path.clone();
        let writer = self.open_with_header()?;

        let mut record: Vec<String> = row.scores.iter().map(f32::to_string).collect();
        record.push(row.emotion.id().to_string());
        record.push(row.emotion.name().to_string());

        writer
            .write_record(&record)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer
                .flush()
                .with_context(|| format!("failed to flush {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Loads the extracted feature table for training.
///
/// Feature columns are all header columns other than the two label
/// columns, kept in file order.
///
/// # Errors
///
/// Fails if the file is missing, the label columns are absent, any value
/// does not parse, or the table holds no data rows.
pub fn read_feature_table(path: impl AsRef<Path>) -> Result<FeatureTable> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| {
        format!(
            "feature table not found: {} (run the extractor first)",
            path.display()
        )
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read {}", path.display()))?
        .clone();

    let label_id_col = headers
        .iter()
        .position(|h| h == LABEL_ID_COLUMN)
        .with_context(|| format!("{} has no {LABEL_ID_COLUMN} column", path.display()))?;
    let label_name_col = headers.iter().position(|h| h == LABEL_NAME_COLUMN);

    let feature_cols: Vec<usize> = (0..headers.len())
        .filter(|&i| i != label_id_col && Some(i) != label_name_col)
        .collect();
    let feature_names: Vec<String> = feature_cols
        .iter()
        .map(|&i| headers[i].to_string())
        .collect();

    let mut data = Vec::new();
    let mut labels = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("malformed row {index} in {}", path.display()))?;

        for &col in &feature_cols {
            let value: f32 = record
                .get(col)
                .unwrap_or("")
                .parse()
                .with_context(|| format!("invalid value in row {index} of {}", path.display()))?;
            data.push(value);
        }

        let id: u8 = record
            .get(label_id_col)
            .unwrap_or("")
            .parse()
            .with_context(|| format!("invalid label in row {index} of {}", path.display()))?;
        let emotion = Emotion::from_id(id)
            .with_context(|| format!("unknown emotion id {id} in row {index}"))?;
        labels.push(emotion);
    }

    if labels.is_empty() {
        bail!("feature table is empty: {}", path.display());
    }

    let features = FeatureMatrix::new(data, labels.len(), feature_names.len())?;
    debug!(
        rows = labels.len(),
        cols = feature_names.len(),
        "loaded feature table"
    );

    Ok(FeatureTable {
        feature_names,
        features,
        labels,
    })
}
