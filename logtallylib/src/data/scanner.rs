//! High-level scanning API.
//!
//! This module drives a line stream through the parser and aggregator,
//! fires progress callbacks, honors cooperative cancellation, and builds the
//! report once the stream is exhausted.
//!
//! Lines are pulled one at a time into a reused buffer, so memory use is
//! bounded by the size of the frequency tables, not the size of the input.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::LogtallyError;
use crate::report::{Report, ReportOptions};
use crate::Result;

use super::aggregator::Aggregator;
use super::progress::{LogProgress, ProgressReporter};
use super::stats::LogStats;

/// Default number of lines between progress callbacks.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000;

/// Path that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// What a cancelled scan hands back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelPolicy {
    /// Keep whatever was tallied so far and report it as a smaller run
    #[default]
    Partial,
    /// Fail with [`LogtallyError::Cancelled`]
    Discard,
}

impl std::str::FromStr for CancelPolicy {
    type Err = LogtallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "partial" => Ok(CancelPolicy::Partial),
            "discard" => Ok(CancelPolicy::Discard),
            other => Err(LogtallyError::InvalidOption(format!(
                "unknown cancel policy '{other}' (expected 'partial' or 'discard')"
            ))),
        }
    }
}

/// Cooperative cancellation flag, checked between lines.
///
/// Clones share the same flag, so a signal handler can hold one clone while
/// the scan holds another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for scanning a log stream.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Fire progress callbacks
    pub verbose: bool,
    /// Lines between progress callbacks
    pub progress_interval: u64,
    /// Checked before each line
    pub cancel: CancelToken,
    /// What to return when the scan is cancelled
    pub cancel_policy: CancelPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cancel: CancelToken::new(),
            cancel_policy: CancelPolicy::Partial,
        }
    }
}

impl ScanOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable progress callbacks.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the number of lines between progress callbacks.
    pub fn progress_interval(mut self, lines: u64) -> Self {
        self.progress_interval = lines;
        self
    }

    /// Use the given cancellation token.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set the cancel policy.
    pub fn cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    /// Check option consistency.
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval == 0 {
            return Err(LogtallyError::InvalidOption(
                "progress interval must be at least 1 line".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a finished (or cancelled) scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Accumulated statistics
    pub stats: LogStats,
    /// Whether the scan stopped early. Only ever true under [`CancelPolicy::Partial`].
    pub cancelled: bool,
}

impl ScanOutcome {
    /// Build the report for this outcome.
    pub fn report(&self, options: &ReportOptions) -> Report {
        Report::from_stats(&self.stats, options)
    }
}

/// Scan a buffered line stream.
///
/// Each line is parsed and folded into the accumulator in stream
/// order, exactly once. Invalid UTF-8 is decoded lossily. A read error aborts
/// the scan with no partial result.
///
/// # Example
///
/// ```rust
/// use logtallylib::{scan_reader, NoProgress, ScanOptions};
///
/// let input = "10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /health HTTP/1.1\" 200 2\nnot a log line\n";
/// let outcome = scan_reader(input.as_bytes(), &ScanOptions::new(), &mut NoProgress).unwrap();
/// assert_eq!(outcome.stats.total_lines, 2);
/// assert_eq!(outcome.stats.valid_lines, 1);
/// ```
pub fn scan_reader<R: BufRead>(
    mut reader: R,
    options: &ScanOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<ScanOutcome> {
    options.validate()?;

    let mut aggregator = Aggregator::new();
    let mut buf = Vec::new();
    let mut cancelled = false;

    loop {
        if options.cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        aggregator.ingest(&line);

        let seen = aggregator.lines_seen();
        if options.verbose && seen % options.progress_interval == 0 {
            progress.on_progress(seen);
        }
    }

    let stats = aggregator.into_stats();
    tracing::debug!(
        total = stats.total_lines,
        valid = stats.valid_lines,
        cancelled,
        "scan finished"
    );

    if cancelled && options.cancel_policy == CancelPolicy::Discard {
        return Err(LogtallyError::Cancelled {
            lines: stats.total_lines,
        });
    }

    Ok(ScanOutcome { stats, cancelled })
}

/// Scan a file, or stdin when `path` is `-`.
pub fn scan_path(
    path: impl AsRef<Path>,
    options: &ScanOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<ScanOutcome> {
    let path = path.as_ref();

    if path == Path::new(STDIN_PATH) {
        tracing::debug!("scanning stdin");
        let stdin = io::stdin();
        return scan_reader(stdin.lock(), options, progress);
    }

    if !path.exists() {
        return Err(LogtallyError::PathNotFound(path.to_path_buf()));
    }

    tracing::debug!(path = %path.display(), "scanning file");
    let file = File::open(path).map_err(|source| file_read_error(path, source))?;

    scan_reader(BufReader::new(file), options, progress).map_err(|e| match e {
        LogtallyError::Io(source) => file_read_error(path, source),
        other => other,
    })
}

fn file_read_error(path: &Path, source: io::Error) -> LogtallyError {
    LogtallyError::FileRead {
        path: path.to_path_buf(),
        source,
    }
}

/// Scan several inputs in parallel and merge their statistics.
///
/// Each path is an independent shard with its own accumulator; shards are
/// merged by pointwise addition, so the result equals scanning the inputs
/// back to back. With `verbose` set, each shard logs its own progress. Any
/// I/O failure fails the whole call.
pub fn scan_files<P>(paths: &[P], options: &ScanOptions) -> Result<ScanOutcome>
where
    P: AsRef<Path> + Sync,
{
    options.validate()?;

    let outcomes = paths
        .par_iter()
        .map(|path| -> Result<ScanOutcome> {
            let path = path.as_ref();
            let mut progress = LogProgress::for_source(path.display().to_string());
            let outcome = scan_path(path, options, &mut progress)?;
            tracing::debug!(
                path = %path.display(),
                lines = outcome.stats.total_lines,
                "shard finished"
            );
            Ok(outcome)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut merged = ScanOutcome::default();
    for outcome in outcomes {
        merged.stats += outcome.stats;
        merged.cancelled |= outcome.cancelled;
    }
    Ok(merged)
}

/// Scan a stream and build its report.
pub fn analyze_reader<R: BufRead>(
    reader: R,
    scan: &ScanOptions,
    report: &ReportOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<Report> {
    Ok(scan_reader(reader, scan, progress)?.report(report))
}

/// Scan a file (or stdin for `-`) and build its report.
pub fn analyze_path(
    path: impl AsRef<Path>,
    scan: &ScanOptions,
    report: &ReportOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<Report> {
    Ok(scan_path(path, scan, progress)?.report(report))
}

/// Scan one or more inputs and build a single report.
///
/// A single input is scanned on the calling thread with `progress`; several
/// inputs go through [`scan_files`].
pub fn analyze_paths(
    paths: &[PathBuf],
    scan: &ScanOptions,
    report: &ReportOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<Report> {
    match paths {
        [] => analyze_path(STDIN_PATH, scan, report, progress),
        [single] => analyze_path(single, scan, report, progress),
        many => Ok(scan_files(many, scan)?.report(report)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::progress::NoProgress;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;

    fn log_line(path: &str, status: u16) -> String {
        format!(r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET {path} HTTP/1.1" {status} 100 "-" "curl/7.68.0""#)
    }

    fn sample_input(n: usize) -> String {
        let mut out = String::new();
        for i in 0..n {
            if i % 7 == 3 {
                out.push_str("garbage line\n");
            } else {
                out.push_str(&log_line(&format!("/p{}", i % 5), [200, 404, 500][i % 3]));
                out.push('\n');
            }
        }
        out
    }

    /// Reader that yields some bytes, then fails.
    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("disk on fire"));
            }
            self.served = true;
            let line = b"first line\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[test]
    fn test_scan_empty_input() {
        let outcome = scan_reader(&b""[..], &ScanOptions::new(), &mut NoProgress).unwrap();
        assert_eq!(outcome.stats, LogStats::new());
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_scan_counts_every_line() {
        let input = sample_input(50);
        let outcome = scan_reader(input.as_bytes(), &ScanOptions::new(), &mut NoProgress).unwrap();
        assert_eq!(outcome.stats.total_lines, 50);
        assert_eq!(outcome.stats.invalid_lines(), 7);
    }

    #[test]
    fn test_scan_last_line_without_newline() {
        let input = format!("{}\n{}", log_line("/a", 200), log_line("/b", 200));
        let outcome = scan_reader(input.as_bytes(), &ScanOptions::new(), &mut NoProgress).unwrap();
        assert_eq!(outcome.stats.valid_lines, 2);
    }

    #[test]
    fn test_scan_trims_crlf_and_indentation() {
        let input = format!("   {}\r\n", log_line("/a", 200));
        let outcome = scan_reader(input.as_bytes(), &ScanOptions::new(), &mut NoProgress).unwrap();
        assert_eq!(outcome.stats.valid_lines, 1);
    }

    #[test]
    fn test_scan_invalid_utf8_is_lossy() {
        let mut input = log_line("/caf\u{e9}", 200).into_bytes();
        input.push(b'\n');
        input.extend_from_slice(b"\xff\xfe broken\n");
        let outcome = scan_reader(&input[..], &ScanOptions::new(), &mut NoProgress).unwrap();
        assert_eq!(outcome.stats.total_lines, 2);
        assert_eq!(outcome.stats.valid_lines, 1);
    }

    #[test]
    fn test_progress_cadence() {
        let input = sample_input(2_500);
        let mut calls = Vec::new();
        let mut reporter = |n: u64| calls.push(n);

        let options = ScanOptions::new().verbose(true).progress_interval(1_000);
        scan_reader(input.as_bytes(), &options, &mut reporter).unwrap();

        assert_eq!(calls, vec![1_000, 2_000]);
    }

    #[test]
    fn test_progress_silent_unless_verbose() {
        let input = sample_input(2_500);
        let mut calls = 0;
        let mut reporter = |_n: u64| calls += 1;

        let options = ScanOptions::new().progress_interval(10);
        scan_reader(input.as_bytes(), &options, &mut reporter).unwrap();

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_progress_does_not_change_report() {
        let input = sample_input(300);
        let report_options = ReportOptions::new();

        let quiet = analyze_reader(
            input.as_bytes(),
            &ScanOptions::new(),
            &report_options,
            &mut NoProgress,
        )
        .unwrap();
        let mut sink = |_n: u64| {};
        let chatty = analyze_reader(
            input.as_bytes(),
            &ScanOptions::new().verbose(true).progress_interval(1),
            &report_options,
            &mut sink,
        )
        .unwrap();

        assert_eq!(quiet, chatty);
    }

    #[test]
    fn test_zero_progress_interval_rejected() {
        let options = ScanOptions::new().progress_interval(0);
        let err = scan_reader(&b""[..], &options, &mut NoProgress).unwrap_err();
        assert!(matches!(err, LogtallyError::InvalidOption(_)));
    }

    #[test]
    fn test_cancel_partial_yields_stats_so_far() {
        let input = sample_input(100);
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut reporter = move |n: u64| {
            if n == 40 {
                trigger.cancel();
            }
        };

        let options = ScanOptions::new()
            .verbose(true)
            .progress_interval(10)
            .cancel_token(token);
        let outcome = scan_reader(input.as_bytes(), &options, &mut reporter).unwrap();

        assert!(outcome.cancelled);
        assert_eq!(outcome.stats.total_lines, 40);
        let report = outcome.report(&ReportOptions::new());
        assert_eq!(report.total_lines, 40);
        assert_eq!(
            report.status_distribution.iter().map(|s| s.count).sum::<u64>(),
            report.valid_lines
        );
    }

    #[test]
    fn test_cancel_discard_returns_error() {
        let input = sample_input(100);
        let token = CancelToken::new();
        token.cancel();

        let options = ScanOptions::new()
            .cancel_token(token)
            .cancel_policy(CancelPolicy::Discard);
        let err = scan_reader(input.as_bytes(), &options, &mut NoProgress).unwrap_err();

        assert!(matches!(err, LogtallyError::Cancelled { lines: 0 }));
    }

    #[test]
    fn test_cancel_policy_from_str() {
        assert_eq!("partial".parse::<CancelPolicy>().unwrap(), CancelPolicy::Partial);
        assert_eq!("Discard".parse::<CancelPolicy>().unwrap(), CancelPolicy::Discard);
        assert!("maybe".parse::<CancelPolicy>().is_err());
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let reader = BufReader::new(FailingReader { served: false });
        let err = scan_reader(reader, &ScanOptions::new(), &mut NoProgress).unwrap_err();
        assert!(matches!(err, LogtallyError::Io(_)));
    }

    #[test]
    fn test_scan_path_missing_file() {
        let err = scan_path("/nonexistent/access.log", &ScanOptions::new(), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, LogtallyError::PathNotFound(_)));
    }

    #[test]
    fn test_scan_path_directory_is_read_error() {
        let dir = tempdir().unwrap();
        let err = scan_path(dir.path(), &ScanOptions::new(), &mut NoProgress).unwrap_err();
        assert!(matches!(err, LogtallyError::FileRead { .. }));
    }

    #[test]
    fn test_scan_path_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("access.log");
        fs::write(&file, sample_input(20)).unwrap();

        let outcome = scan_path(&file, &ScanOptions::new(), &mut NoProgress).unwrap();
        assert_eq!(outcome.stats.total_lines, 20);
    }

    #[test]
    fn test_scan_files_equals_sequential_scan() {
        let dir = tempdir().unwrap();
        let input = sample_input(90);
        let lines: Vec<&str> = input.lines().collect();

        let mut paths = Vec::new();
        for (i, chunk) in lines.chunks(25).enumerate() {
            let path = dir.path().join(format!("shard-{i}.log"));
            fs::write(&path, chunk.join("\n")).unwrap();
            paths.push(path);
        }

        let sharded = scan_files(&paths, &ScanOptions::new()).unwrap();
        let sequential =
            scan_reader(input.as_bytes(), &ScanOptions::new(), &mut NoProgress).unwrap();

        assert_eq!(sharded.stats, sequential.stats);
        assert!(!sharded.cancelled);
    }

    #[test]
    fn test_scan_files_fails_on_any_missing_input() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.log");
        fs::write(&good, sample_input(5)).unwrap();
        let paths = vec![good, dir.path().join("missing.log")];

        assert!(scan_files(&paths, &ScanOptions::new()).is_err());
    }

    #[test]
    fn test_analyze_paths_single_and_many_agree() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        let whole = dir.path().join("whole.log");
        let input = sample_input(40);
        let lines: Vec<&str> = input.lines().collect();
        fs::write(&a, lines[..15].join("\n")).unwrap();
        fs::write(&b, lines[15..].join("\n")).unwrap();
        fs::write(&whole, &input).unwrap();

        let options = ReportOptions::new();
        let split = analyze_paths(&[a, b], &ScanOptions::new(), &options, &mut NoProgress).unwrap();
        let single =
            analyze_paths(&[whole], &ScanOptions::new(), &options, &mut NoProgress).unwrap();

        assert_eq!(split, single);
    }
}
