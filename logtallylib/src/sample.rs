//! Deterministic synthetic access logs.
//!
//! Produces combined-format lines with a trailing response-time token, the
//! shape a typical nginx deployment writes. Useful for benchmarking scans on
//! large inputs and for exercising the parser end to end. The same seed
//! always yields the same lines.

use std::io::Write;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Result;

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS"];

const PATHS: &[&str] = &[
    "/",
    "/api/users",
    "/api/products",
    "/api/orders",
    "/api/auth",
    "/login",
    "/logout",
    "/dashboard",
    "/profile",
    "/settings",
    "/static/css/main.css",
    "/static/js/app.js",
    "/static/js/vendor.js",
    "/images/logo.png",
    "/images/banner.jpg",
    "/favicon.ico",
    "/api/v1/data",
    "/api/v2/users",
    "/health",
    "/metrics",
    "/admin/dashboard",
    "/admin/users",
    "/admin/settings",
    "/products/1234",
    "/products/5678",
    "/cart",
    "/checkout",
];

const STATUS_CODES: &[u16] = &[200, 201, 204, 301, 302, 304, 400, 401, 403, 404, 500, 502, 503];

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) Safari/605.1.15",
    "curl/7.68.0",
    "Python/3.9 aiohttp/3.7.4",
    "PostmanRuntime/7.28.4",
];

const REFERRERS: &[&str] = &["-", "https://example.com", "https://google.com", "https://github.com"];

/// 2023-10-10T00:00:00Z
const BASE_EPOCH: i64 = 1_696_896_000;
const SPAN_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Seeded generator of combined-format log lines.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a, T>(&mut self, pool: &'a [T]) -> &'a T {
        &pool[self.rng.random_range(0..pool.len())]
    }

    /// Produce the next line (without a trailing newline).
    pub fn next_line(&mut self) -> String {
        let ip = format!(
            "{}.{}.{}.{}",
            self.rng.random_range(1..=255u8),
            self.rng.random_range(0..=255u8),
            self.rng.random_range(0..=255u8),
            self.rng.random_range(1..=255u8),
        );
        let offset = self.rng.random_range(0..SPAN_SECONDS);
        let timestamp = DateTime::<Utc>::from_timestamp(BASE_EPOCH - offset, 0).unwrap_or_default();
        let method = *self.pick(METHODS);
        let path = *self.pick(PATHS);
        let status = *self.pick(STATUS_CODES);
        let size = self.rng.random_range(100..=50_000u32);
        let referrer = *self.pick(REFERRERS);
        let agent = *self.pick(USER_AGENTS);
        let response_time: f64 = self.rng.random_range(0.001..5.0);

        format!(
            r#"{ip} - - [{}] "{method} {path} HTTP/1.1" {status} {size} "{referrer}" "{agent}" {response_time:.3}"#,
            timestamp.format("%d/%b/%Y:%H:%M:%S +0000"),
        )
    }
}

impl Iterator for SampleGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_line())
    }
}

/// Write `lines` generated lines to `writer`. Returns the number of bytes written.
pub fn write_sample<W: Write>(mut writer: W, lines: u64, seed: u64) -> Result<u64> {
    let mut generator = SampleGenerator::new(seed);
    let mut bytes = 0u64;

    for _ in 0..lines {
        let line = generator.next_line();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        bytes += line.len() as u64 + 1;
    }
    writer.flush()?;

    tracing::debug!(lines, bytes, seed, "sample written");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parser::parse_line;

    #[test]
    fn test_same_seed_same_lines() {
        let a: Vec<String> = SampleGenerator::new(42).take(20).collect();
        let b: Vec<String> = SampleGenerator::new(42).take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_lines() {
        let a: Vec<String> = SampleGenerator::new(1).take(20).collect();
        let b: Vec<String> = SampleGenerator::new(2).take(20).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_lines_parse() {
        for line in SampleGenerator::new(7).take(500) {
            let record = parse_line(&line).unwrap_or_else(|| panic!("unparsable: {line}"));
            assert!(PATHS.contains(&record.path));
            assert!(STATUS_CODES.contains(&record.status));
            assert!(record.user_agent.is_some());
            assert!(record.timestamp.ends_with("+0000"));
        }
    }

    #[test]
    fn test_write_sample() {
        let mut buf = Vec::new();
        let bytes = write_sample(&mut buf, 25, 3).unwrap();
        assert_eq!(bytes, buf.len() as u64);

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 25);
        assert!(text.ends_with('\n'));
    }
}
