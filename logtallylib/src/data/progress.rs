//! Progress side-channel.
//!
//! A [`ProgressReporter`] is told how many lines have been processed every
//! N lines. It only observes: nothing it does feeds back into the tables,
//! so swapping or removing a reporter never changes the resulting report.

/// Receives periodic progress callbacks from a scan.
pub trait ProgressReporter {
    /// Called with the number of lines processed so far.
    fn on_progress(&mut self, lines: u64);
}

impl<F: FnMut(u64)> ProgressReporter for F {
    fn on_progress(&mut self, lines: u64) {
        (*self)(lines)
    }
}

/// Reporter that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn on_progress(&mut self, _lines: u64) {}
}

/// Reporter that emits a `tracing` info event per callback.
///
/// The CLI routes tracing output to stderr, so these never mix with the
/// report on stdout.
#[derive(Debug, Default, Clone)]
pub struct LogProgress {
    /// Optional input name to tag events with
    pub source: Option<String>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }
}

impl ProgressReporter for LogProgress {
    fn on_progress(&mut self, lines: u64) {
        match &self.source {
            Some(source) => tracing::info!(source = %source, lines, "processed {lines} lines"),
            None => tracing::info!(lines, "processed {lines} lines"),
        }
    }
}
