//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use facemotion_core::domain::{FaceBlendshapes, FeatureRow, PixelSample};
use facemotion_core::ports::{
    BlendshapeDetector, FeatureSink, ProgressEvent, ProgressSink, SampleSource,
};

/// Mock implementation of `SampleSource` for testing.
///
/// Yields pre-built samples and tracks iteration for assertions.
pub struct MockSampleSource {
    samples: Vec<PixelSample>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockSampleSource {
    /// Creates a new mock source with the given samples.
    #[must_use]
    pub fn new(samples: Vec<PixelSample>) -> Self {
        Self {
            samples,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SampleSource for MockSampleSource {
    fn samples(&self) -> Box<dyn Iterator<Item = anyhow::Result<PixelSample>> + Send + '_> {
        let count = Arc::clone(&self.iteration_count);
        if let Ok(mut c) = count.lock() {
            *c += 1;
        }
        Box::new(self.samples.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.samples.len())
    }
}

/// What the mock detector does on each call.
enum DetectorScript {
    /// Returns the same result for every image.
    Always(Vec<FaceBlendshapes>),
    /// Returns one scripted result per call, then empty results.
    Sequence(Mutex<std::vec::IntoIter<Vec<FaceBlendshapes>>>),
    /// Fails every call.
    Failing(String),
}

/// Mock implementation of `BlendshapeDetector` for testing.
pub struct MockDetector {
    script: DetectorScript,
    call_count: Arc<Mutex<usize>>,
}

impl MockDetector {
    /// Returns the same faces for every image.
    #[must_use]
    pub fn always(faces: Vec<FaceBlendshapes>) -> Self {
        Self {
            script: DetectorScript::Always(faces),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns one scripted result per call, in order; later calls see no
    /// faces.
    #[must_use]
    pub fn scripted(results: Vec<Vec<FaceBlendshapes>>) -> Self {
        Self {
            script: DetectorScript::Sequence(Mutex::new(results.into_iter())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Fails every call with the given message.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            script: DetectorScript::Failing(message.to_string()),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the number of `detect` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self
            .call_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlendshapeDetector for MockDetector {
    fn detect(&self, _image: &image::DynamicImage) -> anyhow::Result<Vec<FaceBlendshapes>> {
        if let Ok(mut c) = self.call_count.lock() {
            *c += 1;
        }

        match &self.script {
            DetectorScript::Always(faces) => Ok(faces.clone()),
            DetectorScript::Sequence(iter) => Ok(iter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .next()
                .unwrap_or_default()),
            DetectorScript::Failing(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// Mock implementation of `FeatureSink` for testing.
///
/// Captures rows for later assertions.
#[derive(Default)]
pub struct MockFeatureSink {
    rows: Vec<FeatureRow>,
    finish_count: usize,
}

impl MockFeatureSink {
    /// Creates a new mock sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured rows.
    #[must_use]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Returns the number of times `finish()` was called.
    #[must_use]
    pub const fn finish_count(&self) -> usize {
        self.finish_count
    }
}

impl FeatureSink for MockFeatureSink {
    fn write(&mut self, row: &FeatureRow) -> anyhow::Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.finish_count += 1;
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
