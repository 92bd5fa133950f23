//! Streaming FER2013 CSV source.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use facemotion_core::domain::PixelSample;
use facemotion_core::ports::SampleSource;
use serde::Deserialize;
use tracing::debug;

/// One FER2013 row. Extra columns such as `Usage` are ignored.
#[derive(Debug, Deserialize)]
struct FerRecord {
    emotion: u8,
    pixels: String,
}

/// FER2013 dataset source backed by a CSV file.
///
/// Rows are streamed, not held in memory; a 35k-row dataset of pixel
/// strings would otherwise be several hundred megabytes of `String`s.
#[derive(Debug)]
pub struct FerCsvSource {
    path: PathBuf,
    row_count: usize,
}

impl FerCsvSource {
    /// Opens the dataset, counting rows for progress reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read as
    /// CSV. Individual row contents are validated lazily during iteration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;

        let mut row_count = 0;
        for record in reader.records() {
            record.with_context(|| format!("failed to read {}", path.display()))?;
            row_count += 1;
        }
        debug!(path = %path.display(), rows = row_count, "opened dataset");

        Ok(Self {
            path: path.to_path_buf(),
            row_count,
        })
    }
}

impl SampleSource for FerCsvSource {
    fn samples(&self) -> Box<dyn Iterator<Item = Result<PixelSample>> + Send + '_> {
        let reader = match open_reader(&self.path) {
            Ok(r) => r,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };

        let path = self.path.clone();
        Box::new(
            reader
                .into_deserialize::<FerRecord>()
                .enumerate()
                .map(move |(index, record)| {
                    let record = record
                        .with_context(|| format!("malformed row {index} in {}", path.display()))?;
                    PixelSample::parse(record.emotion, &record.pixels)
                        .with_context(|| format!("invalid row {index} in {}", path.display()))
                }),
        )
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.row_count)
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file =
        File::open(path).with_context(|| format!("dataset not found: {}", path.display()))?;
    Ok(csv::Reader::from_reader(file))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use facemotion_core::domain::Emotion;
    use facemotion_test_support::pixel_string;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_fails_on_open() {
        let err = FerCsvSource::open("/nonexistent/fer2013.csv").unwrap_err();
        assert!(err.to_string().contains("fer2013.csv"));
    }

    #[test]
    fn test_streams_valid_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "emotion,pixels,Usage\n3,{},Training\n0,{},PublicTest\n",
            pixel_string(10),
            pixel_string(20)
        );
        let path = write_csv(&dir, "fer2013.csv", &csv);

        let source = FerCsvSource::open(&path).unwrap();
        assert_eq!(source.count_hint(), Some(2));

        let samples: Vec<PixelSample> = source.samples().map(Result::unwrap).collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].emotion, Emotion::Happy);
        assert_eq!(samples[1].emotion, Emotion::Angry);
    }

    #[test]
    fn test_usage_column_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("emotion,pixels\n6,{}\n", pixel_string(0));
        let path = write_csv(&dir, "fer2013.csv", &csv);

        let source = FerCsvSource::open(&path).unwrap();
        let samples: Vec<PixelSample> = source.samples().map(Result::unwrap).collect();
        assert_eq!(samples[0].emotion, Emotion::Neutral);
    }

    #[test]
    fn test_malformed_row_yields_error_item() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("emotion,pixels\n3,{}\n9,{}\n", pixel_string(1), pixel_string(2));
        let path = write_csv(&dir, "fer2013.csv", &csv);

        let source = FerCsvSource::open(&path).unwrap();
        let results: Vec<Result<PixelSample>> = source.samples().collect();

        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_short_pixel_string_yields_error_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "fer2013.csv", "emotion,pixels\n3,1 2 3\n");

        let source = FerCsvSource::open(&path).unwrap();
        let results: Vec<Result<PixelSample>> = source.samples().collect();
        assert!(results[0].is_err());
    }
}
