//! Report derivation: rank, sort, and annotate a finished scan.
//!
//! A [`Report`] is a pure function of a [`LogStats`] snapshot and the
//! [`ReportOptions`]. Building twice from the same snapshot yields the
//! same report.
//!
//! Rankings are ordered by count descending; equal counts are ordered by key
//! ascending so output never depends on hash map iteration order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::parser::StatusClass;
use crate::data::stats::LogStats;

use super::options::ReportOptions;

/// One row of a top-K ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Endpoint path or user agent
    pub key: String,
    pub count: u64,
}

/// One status code in the distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub status: u16,
    pub class: StatusClass,
    pub count: u64,
    /// Share of valid lines, 0.0 to 100.0
    pub percentage: f64,
    /// Filled cells of a bar scaled to the most frequent status
    pub bar: usize,
}

/// Aggregate share of one status band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassShare {
    pub class: StatusClass,
    pub count: u64,
    pub percentage: f64,
}

/// Ranked summary of a scan, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_lines: u64,
    pub valid_lines: u64,
    pub invalid_lines: u64,
    pub top_endpoints: Vec<RankedEntry>,
    /// Empty when no response had status >= 400; renderers omit the section
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_error_endpoints: Vec<RankedEntry>,
    /// Ordered by status code ascending
    pub status_distribution: Vec<StatusShare>,
    /// Ordered by band
    pub status_classes: Vec<ClassShare>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_user_agents: Vec<RankedEntry>,
    /// Cells in a full status bar
    pub bar_width: usize,
}

impl Report {
    /// Build a report from finished scan statistics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use logtallylib::{Aggregator, Report, ReportOptions};
    ///
    /// let mut agg = Aggregator::new();
    /// agg.ingest(r#"1.2.3.4 - - [t] "GET /a HTTP/1.1" 200 10"#);
    /// agg.ingest(r#"1.2.3.4 - - [t] "GET /b HTTP/1.1" 404 10"#);
    ///
    /// let report = Report::from_stats(agg.stats(), &ReportOptions::new());
    /// assert_eq!(report.valid_lines, 2);
    /// assert_eq!(report.top_error_endpoints[0].key, "/b");
    /// assert_eq!(report.status_distribution[0].percentage, 50.0);
    /// ```
    pub fn from_stats(stats: &LogStats, options: &ReportOptions) -> Self {
        Report {
            total_lines: stats.total_lines,
            valid_lines: stats.valid_lines,
            invalid_lines: stats.invalid_lines(),
            top_endpoints: top_k(&stats.endpoints, options.top_endpoints),
            top_error_endpoints: top_k(&stats.error_endpoints, options.top_errors),
            status_distribution: status_distribution(stats, options.bar_width),
            status_classes: status_classes(stats),
            top_user_agents: top_k(&stats.user_agents, options.top_user_agents),
            bar_width: options.bar_width,
        }
    }

    /// Whether the error ranking has anything to show.
    pub fn has_errors(&self) -> bool {
        !self.top_error_endpoints.is_empty()
    }
}

/// The `k` highest-count entries, count descending then key ascending.
pub fn top_k(table: &HashMap<String, u64>, k: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<(&String, &u64)> = table.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    entries
        .into_iter()
        .take(k)
        .map(|(key, &count)| RankedEntry {
            key: key.clone(),
            count,
        })
        .collect()
}

fn percentage(count: u64, whole: u64) -> f64 {
    count as f64 / whole as f64 * 100.0
}

fn status_distribution(stats: &LogStats, bar_width: usize) -> Vec<StatusShare> {
    // Nothing to divide by
    if stats.valid_lines == 0 {
        return Vec::new();
    }

    let max_count = stats.status_codes.values().copied().max().unwrap_or(0);
    let mut codes: Vec<(u16, u64)> = stats.status_codes.iter().map(|(&s, &c)| (s, c)).collect();
    codes.sort_unstable_by_key(|&(status, _)| status);

    codes
        .into_iter()
        .map(|(status, count)| StatusShare {
            status,
            class: StatusClass::from_code(status),
            count,
            percentage: percentage(count, stats.valid_lines),
            bar: bar_length(count, max_count, bar_width),
        })
        .collect()
}

/// Cells to fill for `count`, scaled so `max_count` fills `width`.
pub fn bar_length(count: u64, max_count: u64, width: usize) -> usize {
    if max_count == 0 {
        return 0;
    }
    (count as f64 / max_count as f64 * width as f64).round() as usize
}

fn status_classes(stats: &LogStats) -> Vec<ClassShare> {
    if stats.valid_lines == 0 {
        return Vec::new();
    }

    let mut classes: Vec<(StatusClass, u64)> = stats.status_class_counts().into_iter().collect();
    classes.sort_unstable_by_key(|&(class, _)| class);

    classes
        .into_iter()
        .map(|(class, count)| ClassShare {
            class,
            count,
            percentage: percentage(count, stats.valid_lines),
        })
        .collect()
}
