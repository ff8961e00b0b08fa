//! Report derivation: rank and annotate finished scan statistics.
//!
//! This is the second stage of the pipeline. It takes a stable
//! [`LogStats`](crate::LogStats) snapshot and produces a [`Report`]:
//!
//! - **Rankings**: top endpoints, top error endpoints, top user agents
//! - **Distribution**: per-status counts with percentages and bar lengths
//! - **Bands**: per-class (2xx, 3xx, ...) totals
//!
//! ## Example
//!
//! ```rust,ignore
//! use logtallylib::report::{Report, ReportOptions};
//!
//! let report = Report::from_stats(&outcome.stats, &ReportOptions::new().top_endpoints(20));
//! ```

pub mod builder;
pub mod options;

pub use builder::{bar_length, top_k, ClassShare, RankedEntry, Report, StatusShare};
pub use options::{ReportOptions, BAR_WIDTH};
