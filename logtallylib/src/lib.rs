//! # logtallylib
//!
//! A streaming HTTP access-log analyzer library.
//!
//! ## Overview
//!
//! logtallylib reads access logs in the common and combined formats one line
//! at a time, tallies requests into frequency tables, and derives a ranked
//! report. The input is never buffered as a whole, so multi-gigabyte logs
//! scan in memory proportional to the number of distinct endpoints, status
//! codes, and user agents.
//!
//! The pipeline has three stages:
//!
//! - **data**: parse lines and accumulate [`LogStats`]
//! - **report**: rank and annotate the stats into a [`Report`]
//! - **output**: format a report into a [`ReportTable`] for display
//!
//! ## Features
//!
//! - **All-or-nothing parsing**: a line either updates every table or only the invalid count
//! - **Mergeable stats**: `LogStats` adds pointwise, so shards can be scanned in parallel
//! - **Progress and cancellation**: side-channel callbacks and a cooperative cancel token
//! - **Pure Rust data types**: returns structured data, no printing
//!
//! ## Example
//!
//! ```rust
//! use logtallylib::{analyze_reader, NoProgress, ReportOptions, ScanOptions};
//!
//! let log = "\
//! 10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] \"GET /api/users HTTP/1.1\" 200 1024 \"-\" \"curl/7.68.0\"
//! 10.0.0.2 - - [10/Oct/2023:13:55:37 +0000] \"GET /api/users HTTP/1.1\" 404 0 \"-\" \"curl/7.68.0\"
//! not a log line
//! ";
//!
//! let report = analyze_reader(
//!     log.as_bytes(),
//!     &ScanOptions::new(),
//!     &ReportOptions::new(),
//!     &mut NoProgress,
//! )
//! .unwrap();
//!
//! assert_eq!(report.total_lines, 3);
//! assert_eq!(report.valid_lines, 2);
//! assert_eq!(report.top_endpoints[0].key, "/api/users");
//! assert_eq!(report.top_error_endpoints[0].count, 1);
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod report;
pub mod sample;

pub use data::{
    analyze_path, analyze_paths, analyze_reader, parse_line, scan_files, scan_path, scan_reader,
    Aggregator, CancelPolicy, CancelToken, LogProgress, LogRecord, LogStats, NoProgress,
    ProgressReporter, ScanOptions, ScanOutcome, StatusClass, DEFAULT_PROGRESS_INTERVAL,
    STDIN_PATH,
};
pub use error::LogtallyError;
pub use output::{ReportTable, TableRow, TableSection, Tone};
pub use report::{ClassShare, RankedEntry, Report, ReportOptions, StatusShare, BAR_WIDTH};
pub use sample::{write_sample, SampleGenerator};

/// Result type for logtallylib operations
pub type Result<T> = std::result::Result<T, LogtallyError>;
