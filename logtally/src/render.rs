//! Template rendering for CLI output using outstanding

use console::Style;
use logtallylib::output::{format_count, ReportTable, TableSection, Tone};
use logtallylib::{RankedEntry, Report, StatusClass};
use outstanding::{render_auto, render_with_output, Theme};
use serde::Serialize;

/// Include templates at compile time
const REPORT_TEMPLATE: &str = include_str!("../templates/report.jinja");
const SUMMARY_TEMPLATE: &str = include_str!("../templates/summary.jinja");

/// Column gap in the report tables
const GAP: &str = "  ";

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Map an `--output` value to an output mode.
pub fn output_mode_from_arg(arg: &str) -> OutputMode {
    match arg {
        "json" => OutputMode::Json,
        "text" => OutputMode::Text,
        "term-debug" => OutputMode::TermDebug,
        "term" => OutputMode::Term,
        _ => OutputMode::Auto,
    }
}

/// One table row, pre-padded, with the theme style to draw it in
#[derive(Debug, Serialize)]
struct RowContext {
    line: String,
    style: &'static str,
}

/// One titled table, pre-padded
#[derive(Debug, Serialize)]
struct SectionContext {
    title: String,
    header: String,
    /// Separator line (dashes)
    rule: String,
    rows: Vec<RowContext>,
}

/// Data context for the report template
#[derive(Debug, Serialize)]
struct ReportContext {
    title: String,
    sections: Vec<SectionContext>,
}

impl ReportContext {
    fn from_table(table: &ReportTable) -> Self {
        Self {
            title: table.title.clone(),
            sections: table.sections.iter().map(section_context).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryEntry {
    count: String,
    key: String,
}

#[derive(Debug, Serialize)]
struct SummaryStatus {
    status: u16,
    count: String,
    percentage: String,
}

/// Data context for the plain summary template
#[derive(Debug, Serialize)]
struct SummaryContext {
    rule: String,
    total_lines: String,
    valid_lines: String,
    /// Only set when some lines were rejected
    invalid_lines: Option<String>,
    top_endpoints: Vec<SummaryEntry>,
    top_error_endpoints: Vec<SummaryEntry>,
    statuses: Vec<SummaryStatus>,
}

impl SummaryContext {
    fn from_report(report: &Report) -> Self {
        let entries = |ranked: &[RankedEntry]| -> Vec<SummaryEntry> {
            ranked
                .iter()
                .map(|entry| SummaryEntry {
                    count: format_count(entry.count),
                    key: entry.key.clone(),
                })
                .collect()
        };

        Self {
            rule: "=".repeat(50),
            total_lines: format_count(report.total_lines),
            valid_lines: format_count(report.valid_lines),
            invalid_lines: (report.invalid_lines > 0).then(|| format_count(report.invalid_lines)),
            top_endpoints: entries(&report.top_endpoints),
            top_error_endpoints: entries(&report.top_error_endpoints),
            statuses: report
                .status_distribution
                .iter()
                .map(|share| SummaryStatus {
                    status: share.status,
                    count: format_count(share.count),
                    percentage: format!("{:.1}", share.percentage),
                })
                .collect(),
        }
    }
}

/// Theme style for a row tone
fn style_name(tone: Tone) -> &'static str {
    match tone {
        Tone::Plain => "plain",
        Tone::Warning => "warning",
        Tone::Status(StatusClass::Success) => "success",
        Tone::Status(StatusClass::Redirect) => "redirect",
        Tone::Status(StatusClass::ClientError) => "client_error",
        Tone::Status(StatusClass::ServerError) => "server_error",
        Tone::Status(StatusClass::Unknown) => "unknown",
    }
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new()
        .add("title", Style::new().bold())
        .add("section", Style::new().bold().cyan())
        .add("header", Style::new().bold())
        .add("rule", Style::new().dim())
        .add("plain", Style::new())
        .add("warning", Style::new().red())
        .add("success", Style::new().green())
        .add("redirect", Style::new().yellow())
        .add("client_error", Style::new().color256(208))
        .add("server_error", Style::new().red().bold())
        .add("unknown", Style::new().dim())
}

fn pad(cell: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>width$}", cell, width = width)
    } else {
        format!("{:<width$}", cell, width = width)
    }
}

/// Pad every cell to its column width so styling never skews alignment
fn section_context(section: &TableSection) -> SectionContext {
    let widths = section.column_widths();
    let right = |i: usize| section.numeric.get(i).copied().unwrap_or(false);
    let join = |cells: &[String]| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| pad(c, widths.get(i).copied().unwrap_or(0), right(i)))
            .collect::<Vec<_>>()
            .join(GAP)
            .trim_end()
            .to_string()
    };

    let total_width = widths.iter().sum::<usize>() + GAP.len() * widths.len().saturating_sub(1);

    SectionContext {
        title: section.title.clone(),
        header: join(&section.headers),
        rule: "-".repeat(total_width),
        rows: section
            .rows
            .iter()
            .map(|row| RowContext {
                line: join(&row.cells),
                style: style_name(row.tone),
            })
            .collect(),
    }
}

/// Render a report.
///
/// `Text` gives the plain summary block; the terminal modes give the ranked
/// tables with status bars, styled when the terminal allows it; `Json`
/// serializes the report itself.
pub fn render_report(
    report: &Report,
    output_mode: OutputMode,
) -> Result<String, Box<dyn std::error::Error>> {
    let theme = create_theme();

    let mut rendered = match output_mode {
        OutputMode::Json => render_auto(REPORT_TEMPLATE, report, &theme, output_mode)?,
        OutputMode::Text => render_with_output(
            SUMMARY_TEMPLATE,
            &SummaryContext::from_report(report),
            &theme,
            output_mode,
        )?,
        _ => {
            let context = ReportContext::from_table(&ReportTable::from_report(report));
            render_with_output(REPORT_TEMPLATE, &context, &theme, output_mode)?
        }
    };

    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
