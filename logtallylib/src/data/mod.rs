//! Data collection: parse lines and accumulate statistics.
//!
//! This module handles the first stage of the pipeline - turning a raw line
//! stream into frequency tables. It provides:
//!
//! - **Parsing**: access-log grammar (`parse_line`, `LogRecord`)
//! - **Statistics**: the accumulator (`LogStats`) and its merge rule
//! - **Aggregation**: per-line ingest (`Aggregator`)
//! - **Scanning**: stream driving, progress, cancellation (`scan_reader`, `scan_files`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use logtallylib::data::{scan_path, NoProgress, ScanOptions};
//!
//! let outcome = scan_path("access.log", &ScanOptions::new(), &mut NoProgress)?;
//! println!("Valid lines: {}", outcome.stats.valid_lines);
//! ```

pub mod aggregator;
pub mod parser;
pub mod progress;
pub mod scanner;
pub mod stats;

pub use aggregator::Aggregator;
pub use parser::{parse_line, LogRecord, StatusClass};
pub use progress::{LogProgress, NoProgress, ProgressReporter};
pub use scanner::{
    analyze_path, analyze_paths, analyze_reader, scan_files, scan_path, scan_reader,
    CancelPolicy, CancelToken, ScanOptions, ScanOutcome, DEFAULT_PROGRESS_INTERVAL, STDIN_PATH,
};
pub use stats::LogStats;
