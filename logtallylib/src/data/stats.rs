//! Running frequency tables for one scan.
//!
//! [`LogStats`] is the accumulator: line counters plus four frequency
//! tables keyed by endpoint, status code, and user agent. The tables are
//! plain hash maps updated with a get-or-zero-then-increment rule; no
//! ordering is kept here. Ordering is imposed only when a report is built.
//!
//! Two `LogStats` merge by pointwise addition (`+` / `+=`), which is
//! commutative and associative. That is what makes sharded scans possible:
//! aggregate contiguous chunks independently, then add them up.

use std::collections::HashMap;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::parser::{LogRecord, StatusClass};

/// Accumulated statistics for one scan.
///
/// Invariants:
/// - `valid_lines <= total_lines`
/// - sum of `status_codes` == `valid_lines`
/// - sum of `endpoints` == `valid_lines`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    /// Every line seen, matched or not
    pub total_lines: u64,
    /// Lines that matched the access-log grammar
    pub valid_lines: u64,
    /// Request path -> hit count
    pub endpoints: HashMap<String, u64>,
    /// Status code -> hit count
    pub status_codes: HashMap<u16, u64>,
    /// Request path -> count of responses with status >= 400
    pub error_endpoints: HashMap<String, u64>,
    /// User agent -> hit count (only lines that carry one)
    pub user_agents: HashMap<String, u64>,
}

fn bump<K: std::hash::Hash + Eq>(table: &mut HashMap<K, u64>, key: K, by: u64) {
    *table.entry(key).or_insert(0) += by;
}

fn bump_str(table: &mut HashMap<String, u64>, key: &str) {
    // Avoid allocating a new key for paths we've already seen
    match table.get_mut(key) {
        Some(count) => *count += 1,
        None => {
            table.insert(key.to_string(), 1);
        }
    }
}

impl LogStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines that did not match the grammar.
    pub fn invalid_lines(&self) -> u64 {
        self.total_lines - self.valid_lines
    }

    /// Whether no line has been seen at all.
    pub fn is_empty(&self) -> bool {
        self.total_lines == 0
    }

    /// Fold one parsed record into every table.
    pub fn record(&mut self, record: &LogRecord<'_>) {
        self.total_lines += 1;
        self.valid_lines += 1;
        bump_str(&mut self.endpoints, record.path);
        bump(&mut self.status_codes, record.status, 1);
        if StatusClass::is_error_code(record.status) {
            bump_str(&mut self.error_endpoints, record.path);
        }
        if let Some(agent) = record.user_agent {
            bump_str(&mut self.user_agents, agent);
        }
    }

    /// Count a line that did not match.
    pub fn reject(&mut self) {
        self.total_lines += 1;
    }

    /// Counts per status band, derived from `status_codes`.
    pub fn status_class_counts(&self) -> HashMap<StatusClass, u64> {
        let mut classes = HashMap::new();
        for (&status, &count) in &self.status_codes {
            bump(&mut classes, StatusClass::from_code(status), count);
        }
        classes
    }

    /// Total responses with status >= 400.
    pub fn error_count(&self) -> u64 {
        self.status_codes
            .iter()
            .filter(|(status, _)| StatusClass::is_error_code(**status))
            .map(|(_, count)| count)
            .sum()
    }
}

impl AddAssign<&LogStats> for LogStats {
    fn add_assign(&mut self, other: &LogStats) {
        self.total_lines += other.total_lines;
        self.valid_lines += other.valid_lines;
        for (path, &count) in &other.endpoints {
            bump(&mut self.endpoints, path.clone(), count);
        }
        for (&status, &count) in &other.status_codes {
            bump(&mut self.status_codes, status, count);
        }
        for (path, &count) in &other.error_endpoints {
            bump(&mut self.error_endpoints, path.clone(), count);
        }
        for (agent, &count) in &other.user_agents {
            bump(&mut self.user_agents, agent.clone(), count);
        }
    }
}

impl AddAssign for LogStats {
    fn add_assign(&mut self, other: Self) {
        *self += &other;
    }
}

impl Add for LogStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += &other;
        self
    }
}
