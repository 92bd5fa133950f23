//! Console progress adapter using indicatif.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicUsize, Ordering};

use facemotion_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::params::PROGRESS_INTERVAL;

/// Progress adapter for the extraction run.
///
/// Shows an indicatif bar when stderr is a terminal; otherwise logs a
/// summary line every [`PROGRESS_INTERVAL`] rows so piped runs still show
/// liveness without flooding the log.
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
    seen: AtomicUsize,
    skipped: AtomicUsize,
}

impl ConsoleProgress {
    /// Creates a progress adapter sized to `total`, if known.
    #[must_use]
    pub fn new(total: Option<usize>) -> Self {
        let bar = if std::io::stderr().is_terminal() {
            let bar = total.map_or_else(ProgressBar::new_spinner, |t| ProgressBar::new(t as u64));
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            Some(bar)
        } else {
            None
        };

        Self {
            bar,
            seen: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        }
    }

    fn advance(&self) {
        let seen = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(bar) = &self.bar {
            bar.inc(1);
        } else if seen % PROGRESS_INTERVAL == 0 {
            let skipped = self.skipped.load(Ordering::Relaxed);
            info!("Processed {seen} rows ({skipped} without a face)");
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total, .. } => {
                if let (Some(bar), Some(t)) = (&self.bar, total) {
                    bar.set_length(t as u64);
                }
            }
            ProgressEvent::Completed { .. } => self.advance(),
            ProgressEvent::Skipped { .. } => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                self.advance();
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {processed} extracted, {skipped} skipped"
                    ));
                }
            }
        }
    }
}
