//! Plain-text report of the selected file diffs.

use crate::diff::{self, FileChange, FileStatus};
use crate::github::RepoRef;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const RULE_WIDTH: usize = 80;

pub struct ReportWriter<W: Write> {
    out: W,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (or truncate) the report file
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_title(&mut self, repo: &RepoRef, commit: &str) -> io::Result<()> {
        writeln!(self.out, "--- Changes for Commit {} in {} ---\n", commit, repo)?;
        self.out.flush()
    }

    /// Write one file section; `position` is 1-based within `total`.
    ///
    /// Each section is flushed so earlier sections survive a later failure.
    pub fn write_file(&mut self, position: usize, total: usize, file: &FileChange) -> io::Result<()> {
        let header = format!(
            "File {}/{}: {} (Status: {})",
            position, total, file.filename, file.status
        );
        writeln!(self.out, "{}", header)?;
        writeln!(self.out, "{}", "-".repeat(header.chars().count()))?;
        writeln!(self.out, "{}", status_line(file))?;
        writeln!(self.out, "{}", diff::render(file.patch.as_deref()))?;
        writeln!(self.out, "\n{}\n", "=".repeat(RULE_WIDTH))?;
        self.out.flush()
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn status_line(file: &FileChange) -> String {
    match &file.status {
        FileStatus::Added => "  This file was added.".to_string(),
        FileStatus::Removed => "  This file was removed.".to_string(),
        FileStatus::Modified => "  This file was modified:".to_string(),
        FileStatus::Renamed => format!(
            "  This file was renamed from '{}'.",
            file.previous_filename.as_deref().unwrap_or("unknown")
        ),
        FileStatus::Other(status) => format!("  Unknown status: {}", status),
    }
}
