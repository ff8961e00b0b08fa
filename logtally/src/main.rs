//! # logtally
//!
//! A CLI for analyzing HTTP access logs.
//!
//! ## Overview
//!
//! logtally is built on top of logtallylib. It streams one or more access
//! logs (common or combined format) and prints a ranked report: top
//! endpoints, error hotspots, and the status-code distribution.
//!
//! ## Features
//!
//! - **Streaming**: files of any size, read line by line
//! - **Parallel shards**: several files are scanned concurrently and merged
//! - **Multiple output formats**: ranked tables (styled on a terminal), plain summary, JSON
//! - **Progress on stderr**: `-v` logs "processed N lines" without touching the report
//! - **Interruptible**: Ctrl-C stops the scan; by default the lines read so far are reported
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a file
//! logtally /var/log/nginx/access.log
//!
//! # Read from stdin
//! zcat access.log.gz | logtally
//!
//! # Several files, merged into one report, as JSON
//! logtally access.log.1 access.log.2 --output json
//!
//! # Progress every 100k lines
//! logtally big.log -v --progress-every 100000
//!
//! # Generate a synthetic log
//! logtally generate --lines 1000000 --seed 7 > sample.log
//! ```

mod render;

use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use logtallylib::{
    analyze_paths, write_sample, CancelPolicy, CancelToken, LogProgress, LogtallyError,
    ReportOptions, ScanOptions, DEFAULT_PROGRESS_INTERVAL,
};
use tracing_subscriber::EnvFilter;

use render::{output_mode_from_arg, render_report, OutputMode};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("logtally")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Streaming HTTP access-log analyzer")
        .arg(
            Arg::new("files")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("Log files to analyze ('-' or none reads stdin)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log progress and diagnostics to stderr"),
        )
        .arg(
            Arg::new("progress-every")
                .long("progress-every")
                .value_name("LINES")
                .value_parser(value_parser!(u64))
                .default_value("1000")
                .help("Lines between progress messages in verbose mode"),
        )
        .arg(
            Arg::new("top")
                .short('n')
                .long("top")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .help("Number of endpoints in the top-endpoints ranking"),
        )
        .arg(
            Arg::new("top-errors")
                .long("top-errors")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("Number of endpoints in the error ranking"),
        )
        .arg(
            Arg::new("top-agents")
                .long("top-agents")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("5")
                .help("Number of user agents in the user-agent ranking"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["auto", "term", "text", "term-debug", "json"])
                .default_value("auto")
                .help("Output format: styled tables, plain summary, or JSON"),
        )
        .arg(
            Arg::new("on-cancel")
                .long("on-cancel")
                .value_parser(["partial", "discard"])
                .default_value("partial")
                .help("On Ctrl-C: report lines read so far, or discard them"),
        )
        .subcommand(
            Command::new("generate")
                .about("Write a synthetic combined-format access log to stdout")
                .arg(
                    Arg::new("lines")
                        .short('l')
                        .long("lines")
                        .value_parser(value_parser!(u64))
                        .default_value("1000")
                        .help("Number of lines to generate"),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .default_value("42")
                        .help("Random seed; the same seed yields the same log"),
                ),
        )
}

/// Route tracing to stderr. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Build report options from matches
fn build_report_options(matches: &ArgMatches) -> ReportOptions {
    let get = |id: &str, fallback: usize| matches.get_one::<usize>(id).copied().unwrap_or(fallback);
    let defaults = ReportOptions::default();

    ReportOptions::new()
        .top_endpoints(get("top", defaults.top_endpoints))
        .top_errors(get("top-errors", defaults.top_errors))
        .top_user_agents(get("top-agents", defaults.top_user_agents))
}

/// Exit status for a scan aborted by a second interrupt (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Install a Ctrl-C handler that trips the scan's cancel token.
///
/// The token is only checked between lines, so a scan blocked on a silent
/// stdin would never see it. A second interrupt exits immediately.
fn install_cancel_handler() -> Result<CancelToken, anyhow::Error> {
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            eprintln!("Error: interrupted");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        tracing::warn!("interrupt received, stopping scan (press Ctrl-C again to abort)");
        handler_token.cancel();
    })?;
    Ok(token)
}

/// Handler for the default analyze command
fn analyze_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let verbose = matches.get_flag("verbose");
    let interval = matches
        .get_one::<u64>("progress-every")
        .copied()
        .unwrap_or(DEFAULT_PROGRESS_INTERVAL);
    let policy: CancelPolicy = matches
        .get_one::<String>("on-cancel")
        .map(|s| s.parse::<CancelPolicy>())
        .transpose()?
        .unwrap_or_default();
    let mode = matches
        .get_one::<String>("output")
        .map(|s| output_mode_from_arg(s))
        .unwrap_or(OutputMode::Auto);

    let token = install_cancel_handler()?;
    let scan = ScanOptions::new()
        .verbose(verbose)
        .progress_interval(interval)
        .cancel_token(token.clone())
        .cancel_policy(policy);
    let report_options = build_report_options(matches);

    let mut progress = match files.as_slice() {
        [single] => LogProgress::for_source(single.display().to_string()),
        _ => LogProgress::new(),
    };

    tracing::debug!(files = files.len(), ?policy, "starting scan");
    let report = analyze_paths(&files, &scan, &report_options, &mut progress)?;

    if token.is_cancelled() {
        tracing::warn!(
            lines = report.total_lines,
            "scan interrupted, reporting partial results"
        );
    }

    render_report(&report, mode).map_err(|e| anyhow::anyhow!("{e}"))
}

/// Handler for the generate subcommand
fn generate_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let lines = matches.get_one::<u64>("lines").copied().unwrap_or(1000);
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(42);

    let stdout = io::stdout();
    match write_sample(BufWriter::new(stdout.lock()), lines, seed) {
        Ok(_) => Ok(String::new()),
        // Downstream closed the pipe (e.g. `| head`)
        Err(LogtallyError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("generate", sub)) => generate_handler(sub),
        _ => analyze_handler(&matches),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
