//! Streaming aggregator: one `ingest` call per input line.

use super::parser::parse_line;
use super::stats::LogStats;

/// Folds raw lines into a [`LogStats`] accumulator.
///
/// `ingest` takes `&mut self`, so only one writer can touch the tables at a
/// time. A matched line updates every table inside a single call; a
/// rejected line only bumps the total.
#[derive(Debug, Default)]
pub struct Aggregator {
    stats: LogStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one raw line. Returns `true` if the line matched the grammar.
    ///
    /// Surrounding whitespace, including a trailing `\r\n`, is ignored.
    pub fn ingest(&mut self, line: &str) -> bool {
        match parse_line(line.trim()) {
            Some(record) => {
                self.stats.record(&record);
                true
            }
            None => {
                self.stats.reject();
                false
            }
        }
    }

    /// Lines ingested so far.
    pub fn lines_seen(&self) -> u64 {
        self.stats.total_lines
    }

    /// Current snapshot of the tables.
    pub fn stats(&self) -> &LogStats {
        &self.stats
    }

    pub fn into_stats(self) -> LogStats {
        self.stats
    }
}
