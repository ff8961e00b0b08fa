//! Output formatting: present a report as tables.
//!
//! This module handles the final stage of the pipeline - formatting a
//! [`Report`](crate::Report) for display. It provides:
//!
//! - **ReportTable**: titled sections with headers and pre-formatted rows
//! - **TableRow**: individual row with cells and a styling hint
//!
//! ReportTable is a pure presentation layer. Drawing it (colors, borders,
//! terminal widths) is left to the caller.
//!
//! ## Example
//!
//! ```rust,ignore
//! use logtallylib::output::ReportTable;
//!
//! let table = ReportTable::from_report(&report);
//! // table.sections[0].title == "General"
//! ```

pub mod table;

pub use table::{format_bar, format_count, ReportTable, TableRow, TableSection, Tone};
