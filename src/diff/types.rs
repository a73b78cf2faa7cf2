use serde::Deserialize;
use std::fmt;

/// Status of a file in a commit, as reported by the hosting API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    /// Any status we don't describe specially (`copied`, `changed`, ...)
    Other(String),
}

impl FileStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Other(s) => s,
        }
    }
}

impl From<String> for FileStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "added" => FileStatus::Added,
            "modified" => FileStatus::Modified,
            "removed" => FileStatus::Removed,
            "renamed" => FileStatus::Renamed,
            _ => FileStatus::Other(s),
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A changed file in a commit
#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
    /// Only set for renames
    #[serde(default)]
    pub previous_filename: Option<String>,
    /// Unified diff body; missing for binary files and very large diffs
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default)]
    pub additions: usize,
    #[serde(default)]
    pub deletions: usize,
}

/// Type of a diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineType {
    Add,
    Remove,
    Context,
    Hunk,
    /// File headers and `\ No newline at end of file` markers
    Ignored,
}

/// A single line in a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub old_line_num: Option<u64>,
    pub new_line_num: Option<u64>,
    pub content: String,
}

/// A parsed hunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub struct DiffHunk {
    pub old_start: u64,
    pub old_lines: u64,
    pub new_start: u64,
    pub new_lines: u64,
}
