//! Access-log line grammar.
//!
//! Recognizes the common and combined log formats:
//!
//! ```text
//! <ip> <identity> <user> [<timestamp>] "<method> <path> <protocol>" <status> <size> ["<referrer>"] ["<user-agent>"]
//! ```
//!
//! Matching is all-or-nothing: a line either yields a complete [`LogRecord`]
//! or `None`. A non-matching line is an expected outcome, never an error.
//! Content after the last recognized field is ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LOG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<ip>\S+)\s+",
        r"(?P<identity>\S+)\s+",
        r"(?P<user>\S+)\s+",
        r"\[(?P<timestamp>[^\]]+)\]\s+",
        r#""(?P<method>\S+)\s+"#,
        r"(?P<path>\S+)\s+",
        r#"(?P<protocol>[^"]+)"\s+"#,
        r"(?P<status>[0-9]{3})\s+",
        r"(?P<size>\S+)",
        r#"(?:\s+"(?P<referrer>[^"]*)")?"#,
        r#"(?:\s+"(?P<user_agent>[^"]*)")?"#,
    ))
    .expect("access log pattern is a valid regex")
});

/// One parsed access-log line. Borrows from the raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub client_address: &'a str,
    pub identity: &'a str,
    pub user: &'a str,
    /// Opaque timestamp text between the brackets
    pub timestamp: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub protocol: &'a str,
    pub status: u16,
    /// Response size token, possibly `-`
    pub size: &'a str,
    pub referrer: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

impl LogRecord<'_> {
    /// Status band of this record.
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_code(self.status)
    }
}

/// Parse a single line. Returns `None` when the line does not match the grammar.
///
/// # Example
///
/// ```rust
/// use logtallylib::parse_line;
///
/// let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /api/users HTTP/1.1" 200 1024 "-" "curl/7.68.0""#;
/// let record = parse_line(line).unwrap();
/// assert_eq!(record.path, "/api/users");
/// assert_eq!(record.status, 200);
///
/// assert!(parse_line("not a log line").is_none());
/// ```
pub fn parse_line(line: &str) -> Option<LogRecord<'_>> {
    let caps = LOG_PATTERN.captures(line)?;
    // Three ASCII digits always fit in u16
    let status = caps.name("status")?.as_str().parse().ok()?;

    Some(LogRecord {
        client_address: caps.name("ip")?.as_str(),
        identity: caps.name("identity")?.as_str(),
        user: caps.name("user")?.as_str(),
        timestamp: caps.name("timestamp")?.as_str(),
        method: caps.name("method")?.as_str(),
        path: caps.name("path")?.as_str(),
        protocol: caps.name("protocol")?.as_str(),
        status,
        size: caps.name("size")?.as_str(),
        referrer: caps.name("referrer").map(|m| m.as_str()),
        user_agent: caps.name("user_agent").map(|m| m.as_str()),
    })
}

/// HTTP status band. Ranges are closed-open: `[200, 300)` is success and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn from_code(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    /// Whether a status code counts toward error rankings (any code >= 400).
    pub fn is_error_code(status: u16) -> bool {
        status >= 400
    }

    /// Human-readable label used by renderers.
    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Success => "OK",
            StatusClass::Redirect => "Redirect",
            StatusClass::ClientError => "Client Error",
            StatusClass::ServerError => "Server Error",
            StatusClass::Unknown => "Unknown",
        }
    }
}
