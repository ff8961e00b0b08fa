//! Options controlling how a report is derived from scan statistics.

use serde::{Deserialize, Serialize};

/// Width of the proportional status bar, in cells.
pub const BAR_WIDTH: usize = 20;

/// Ranking sizes and bar width for [`Report`](super::Report) building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Maximum number of endpoints in the top-endpoints ranking
    pub top_endpoints: usize,
    /// Maximum number of endpoints in the error ranking
    pub top_errors: usize,
    /// Maximum number of user agents in the user-agent ranking
    pub top_user_agents: usize,
    /// Cells in a full status bar
    pub bar_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_endpoints: 10,
            top_errors: 5,
            top_user_agents: 5,
            bar_width: BAR_WIDTH,
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the endpoint ranking size
    pub fn top_endpoints(mut self, n: usize) -> Self {
        self.top_endpoints = n;
        self
    }

    /// Builder: set the error ranking size
    pub fn top_errors(mut self, n: usize) -> Self {
        self.top_errors = n;
        self
    }

    /// Builder: set the user-agent ranking size
    pub fn top_user_agents(mut self, n: usize) -> Self {
        self.top_user_agents = n;
        self
    }

    /// Builder: set the status bar width
    pub fn bar_width(mut self, width: usize) -> Self {
        self.bar_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ReportOptions::default();
        assert_eq!(opts.top_endpoints, 10);
        assert_eq!(opts.top_errors, 5);
        assert_eq!(opts.top_user_agents, 5);
        assert_eq!(opts.bar_width, 20);
    }

    #[test]
    fn test_builder() {
        let opts = ReportOptions::new().top_endpoints(3).top_errors(1).bar_width(40);
        assert_eq!(opts.top_endpoints, 3);
        assert_eq!(opts.top_errors, 1);
        assert_eq!(opts.bar_width, 40);
    }
}
