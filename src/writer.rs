//! Report persistence.
//!
//! Each cycle overwrites `<title>_LATEST.md` and `<title>_LATEST.md.html`.
//! With history enabled both are also copied to
//! `<title>_<yyyyMMdd_HHMM>.md(.html)`.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::report::Report;

const MD_EXT: &str = "md";
const HTML_EXT: &str = "md.html";

/// Paths written by one [`ReportWriter::write`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub latest_markdown: PathBuf,
    pub latest_html: PathBuf,
    /// Timestamped copies, empty unless history is kept.
    pub history: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    out_dir: PathBuf,
    release_title: String,
    keep_history: bool,
}

impl ReportWriter {
    pub fn new(out_dir: impl Into<PathBuf>, release_title: impl Into<String>, keep_history: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            release_title: release_title.into(),
            keep_history,
        }
    }

    fn path(&self, stamp: &str, ext: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}_{}.{}", self.release_title, stamp, ext))
    }

    pub fn latest_path(&self, html: bool) -> PathBuf {
        self.path("LATEST", if html { HTML_EXT } else { MD_EXT })
    }

    /// Write both variants of the report, bytes unchanged.
    pub fn write(&self, report: &Report) -> io::Result<WrittenFiles> {
        let stamp = report.generated_at.format("%Y%m%d_%H%M").to_string();
        let mut history = Vec::new();

        let latest_markdown = self.latest_path(false);
        fs::write(&latest_markdown, &report.markdown)?;
        if self.keep_history {
            let copy = self.path(&stamp, MD_EXT);
            fs::copy(&latest_markdown, &copy)?;
            history.push(copy);
        }

        let latest_html = self.latest_path(true);
        fs::write(&latest_html, &report.html)?;
        if self.keep_history {
            let copy = self.path(&stamp, HTML_EXT);
            fs::copy(&latest_html, &copy)?;
            history.push(copy);
        }

        tracing::debug!("Report written to {}", latest_markdown.display());
        Ok(WrittenFiles {
            latest_markdown,
            latest_html,
            history,
        })
    }
}
