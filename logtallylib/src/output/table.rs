//! Table-ready data structures for report output.
//!
//! This module provides `ReportTable`, a presentation-ready structure that
//! a renderer can lay out directly or serialize to JSON.
//!
//! The data flow is:
//! 1. Raw Data (LogStats)
//! 2. Report (ranked, sorted, annotated)
//! 3. ReportTable (formatted strings for display)
//!
//! ReportTable only formats: no ranking or sorting happens here.

use serde::{Deserialize, Serialize};

use crate::data::parser::StatusClass;
use crate::report::{RankedEntry, Report};

/// Styling hint for a row. Renderers decide what each tone looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Plain,
    Warning,
    Status(StatusClass),
}

/// A single row in a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Values for each column, ready for display
    pub cells: Vec<String>,
    pub tone: Tone,
}

/// One titled table in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSection {
    pub title: String,
    pub headers: Vec<String>,
    /// Columns that should be right-aligned
    pub numeric: Vec<bool>,
    pub rows: Vec<TableRow>,
}

impl TableSection {
    fn new(title: &str, headers: &[(&str, bool)]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|(h, _)| h.to_string()).collect(),
            numeric: headers.iter().map(|(_, n)| *n).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, cells: Vec<String>, tone: Tone) {
        self.rows.push(TableRow { cells, tone });
    }

    /// Display width of each column (header included).
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }
        widths
    }
}

/// Table-ready report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub sections: Vec<TableSection>,
}

impl ReportTable {
    /// Format a report into titled sections.
    ///
    /// The error section is left out when no endpoint returned an error, and
    /// the invalid-lines row only appears when there are invalid lines.
    pub fn from_report(report: &Report) -> Self {
        let mut sections = vec![
            general_section(report),
            ranking_section("Top endpoints", "Endpoint", "Requests", &report.top_endpoints),
        ];

        if report.has_errors() {
            sections.push(ranking_section(
                "Top error endpoints",
                "Endpoint",
                "Errors",
                &report.top_error_endpoints,
            ));
        }

        sections.push(status_section(report));

        if !report.top_user_agents.is_empty() {
            sections.push(ranking_section(
                "Top user agents",
                "User agent",
                "Requests",
                &report.top_user_agents,
            ));
        }

        ReportTable {
            title: "Access log report".to_string(),
            sections,
        }
    }
}

fn general_section(report: &Report) -> TableSection {
    let mut section = TableSection::new("General", &[("Metric", false), ("Value", true)]);
    section.push(
        vec!["Total lines".to_string(), format_count(report.total_lines)],
        Tone::Plain,
    );
    section.push(
        vec!["Valid lines".to_string(), format_count(report.valid_lines)],
        Tone::Plain,
    );
    if report.invalid_lines > 0 {
        section.push(
            vec!["Invalid lines".to_string(), format_count(report.invalid_lines)],
            Tone::Warning,
        );
    }
    section
}

fn ranking_section(
    title: &str,
    label: &str,
    count_header: &str,
    entries: &[RankedEntry],
) -> TableSection {
    let mut section = TableSection::new(title, &[("#", true), (count_header, true), (label, false)]);
    for (idx, entry) in entries.iter().enumerate() {
        section.push(
            vec![(idx + 1).to_string(), format_count(entry.count), entry.key.clone()],
            Tone::Plain,
        );
    }
    section
}

fn status_section(report: &Report) -> TableSection {
    let mut section = TableSection::new(
        "Status distribution",
        &[
            ("Status", false),
            ("Type", false),
            ("Requests", true),
            ("Share", true),
            ("Bar", false),
        ],
    );
    for share in &report.status_distribution {
        section.push(
            vec![
                share.status.to_string(),
                share.class.label().to_string(),
                format_count(share.count),
                format!("{:.1}%", share.percentage),
                format_bar(share.bar, report.bar_width),
            ],
            Tone::Status(share.class),
        );
    }
    section
}

/// Format a count with thousands separators: `1234567` -> `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a bar of `filled` cells out of `width`.
pub fn format_bar(filled: usize, width: usize) -> String {
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::LogStats;
    use crate::report::ReportOptions;

    fn sample_report() -> Report {
        let mut stats = LogStats::new();
        stats.total_lines = 6;
        stats.valid_lines = 5;
        stats.endpoints.insert("/a".to_string(), 3);
        stats.endpoints.insert("/b".to_string(), 2);
        stats.status_codes.insert(200, 3);
        stats.status_codes.insert(404, 2);
        stats.error_endpoints.insert("/b".to_string(), 2);
        Report::from_stats(&stats, &ReportOptions::new())
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(0, 4), "░░░░");
        assert_eq!(format_bar(2, 4), "██░░");
        assert_eq!(format_bar(9, 4), "████");
    }

    #[test]
    fn test_sections() {
        let table = ReportTable::from_report(&sample_report());
        let titles: Vec<&str> = table.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["General", "Top endpoints", "Top error endpoints", "Status distribution"]
        );

        let general = &table.sections[0];
        assert_eq!(general.rows.len(), 3);
        assert_eq!(general.rows[2].tone, Tone::Warning);

        let status = &table.sections[3];
        assert_eq!(status.rows[0].cells[0], "200");
        assert_eq!(status.rows[0].cells[3], "60.0%");
        assert_eq!(status.rows[1].tone, Tone::Status(StatusClass::ClientError));
    }

    #[test]
    fn test_error_section_omitted_without_errors() {
        let report = Report::from_stats(&LogStats::new(), &ReportOptions::new());
        let table = ReportTable::from_report(&report);
        assert!(table.sections.iter().all(|s| s.title != "Top error endpoints"));
        // No invalid-lines row for an empty scan
        assert_eq!(table.sections[0].rows.len(), 2);
    }

    #[test]
    fn test_column_widths() {
        let table = ReportTable::from_report(&sample_report());
        let widths = table.sections[1].column_widths();
        assert_eq!(widths, vec![1, 8, 8]);
    }
}
