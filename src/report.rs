//! Markdown report rendering.
//!
//! A report is a level-one title, one section per tag group and a
//! generation timestamp. The HTML twin is the same text with a Markdeep
//! footer, so a browser renders the Markdown when the file is opened
//! directly.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use prettytable::format::{FormatBuilder, LinePosition, LineSeparator, TableFormat};
use prettytable::{Cell, Row, Table};
use regex::Regex;

use crate::models::Release;

/// Appended to the HTML variant to make Markdeep render the raw Markdown.
pub const MARKDEEP_FOOTER: &str = concat!(
    r#"<!-- Markdeep: --><style class="fallback">body{visibility:hidden;white-space:pre;font-family:monospace}</style>"#,
    r#"<script src="markdeep.min.js" charset="utf-8"></script>"#,
    r#"<script src="https://morgan3d.github.io/markdeep/latest/markdeep.min.js?" charset="utf-8"></script>"#,
    r#"<script>window.alreadyProcessedMarkdeep||(document.body.style.visibility="visible")</script>"#,
);

const NO_RELEASES: &str = "No releases found.";
const HEADER: [&str; 5] = ["Release", "Status", "Active Phase", "Active task", "Task type"];

/// A titled group of releases.
#[derive(Debug, Clone)]
pub struct Section {
    pub heading: String,
    pub releases: Vec<Release>,
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub markdown: String,
    pub html: String,
    pub generated_at: NaiveDateTime,
}

/// Remove ticket-number prefixes such as `220519A00-` from a release title.
pub fn strip_ticket_prefix(title: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d*A\d*-").expect("ticket prefix pattern is valid"));
    re.replace_all(title, "").into_owned()
}

/// One table row for a release.
///
/// Active-task columns are overwritten per task, so with several active
/// tasks only the last one shows up.
fn release_row(release: &Release) -> [String; 5] {
    let mut phase = "-".to_string();
    let mut task = "-".to_string();
    let mut task_type = "-".to_string();
    for active in &release.active_tasks {
        phase = active.phase.title.clone();
        task = active.title.clone();
        task_type = active.task_type.clone();
    }
    [
        format!(" [{}]({})", strip_ticket_prefix(&release.title), release.url),
        release.status.to_string(),
        phase,
        task,
        task_type,
    ]
}

/// Pipe-table layout: bordered rows, one dashed rule under the titles.
fn markdown_format() -> TableFormat {
    FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separators(&[LinePosition::Title], LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

/// Keep a cell on one line and inside its column.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Left-aligned Markdown table, without a trailing newline.
pub fn render_table<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(Row::new(header.iter().map(|h| Cell::new(h)).collect()));
    for row in rows {
        table.add_row(Row::new(
            row.iter().map(|cell| Cell::new(&escape_cell(cell))).collect(),
        ));
    }
    table.to_string().trim_end().to_string()
}

/// Render one section: heading plus table, or the empty marker.
pub fn render_section(heading: &str, releases: &[Release]) -> String {
    let mut output = format!("## {}\n", heading);
    if releases.is_empty() {
        output.push_str(NO_RELEASES);
        output.push_str("\n\n");
    } else {
        let rows: Vec<[String; 5]> = releases.iter().map(release_row).collect();
        output.push_str(&render_table(HEADER, &rows));
        output.push('\n');
    }
    output
}

/// Assemble the full report for the monitored release title.
pub fn build_report(release_title: &str, sections: &[Section], generated_at: NaiveDateTime) -> Report {
    let mut markdown = format!("# {}\n\n", release_title);
    for section in sections {
        markdown.push_str(&render_section(&section.heading, &section.releases));
    }
    markdown.push_str(&format!(
        "Time of generation: {}\n",
        generated_at.format("%Y.%m.%d %H:%M")
    ));

    let html = format!("{}\n{}", markdown, MARKDEEP_FOOTER);
    Report {
        markdown,
        html,
        generated_at,
    }
}
