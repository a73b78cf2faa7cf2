//! Line-numbered rendering of unified diff patches.
//!
//! Two counters track the current line in the old and the new revision.
//! Only a hunk header moves them to a new position; every removed, added or
//! context line then advances the side(s) it belongs to by one.

use super::types::{DiffHunk, DiffLine, DiffLineType};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Rendered in place of a missing or empty patch
pub const NO_PATCH_PLACEHOLDER: &str =
    "  (No detailed patch content available for this file, e.g., binary or large file)";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hunk header regex")
});

/// Parse `@@ -old[,count] +new[,count] @@`. Omitted counts are 1.
pub fn parse_hunk_header(line: &str) -> Option<DiffHunk> {
    let caps = HUNK_HEADER.captures(line)?;
    let number = |i: usize| caps.get(i).map(|m| m.as_str().parse::<u64>());

    Some(DiffHunk {
        old_start: number(1)?.ok()?,
        old_lines: number(2).unwrap_or(Ok(1)).ok()?,
        new_start: number(3)?.ok()?,
        new_lines: number(4).unwrap_or(Ok(1)).ok()?,
    })
}

/// Classify and number every line of a patch.
pub fn parse_patch(patch: &str) -> Vec<DiffLine> {
    let mut old_line: u64 = 0;
    let mut new_line: u64 = 0;
    let mut lines = Vec::new();

    for raw in patch.split('\n') {
        let line = if raw.starts_with("--- a/") || raw.starts_with("+++ b/") {
            ignored(raw)
        } else if raw.starts_with("@@") {
            // A header we can't read keeps the counters where they were
            if let Some(hunk) = parse_hunk_header(raw) {
                old_line = hunk.old_start;
                new_line = hunk.new_start;
            }
            DiffLine {
                line_type: DiffLineType::Hunk,
                old_line_num: None,
                new_line_num: None,
                content: raw.to_string(),
            }
        } else if let Some(text) = raw.strip_prefix('+') {
            let line = DiffLine {
                line_type: DiffLineType::Add,
                old_line_num: None,
                new_line_num: Some(new_line),
                content: text.trim().to_string(),
            };
            new_line = new_line.saturating_add(1);
            line
        } else if let Some(text) = raw.strip_prefix('-') {
            let line = DiffLine {
                line_type: DiffLineType::Remove,
                old_line_num: Some(old_line),
                new_line_num: None,
                content: text.trim().to_string(),
            };
            old_line = old_line.saturating_add(1);
            line
        } else if let Some(text) = raw.strip_prefix(' ') {
            let line = DiffLine {
                line_type: DiffLineType::Context,
                old_line_num: Some(old_line),
                new_line_num: Some(new_line),
                content: text.trim().to_string(),
            };
            old_line = old_line.saturating_add(1);
            new_line = new_line.saturating_add(1);
            line
        } else {
            ignored(raw)
        };
        lines.push(line);
    }

    lines
}

fn ignored(raw: &str) -> DiffLine {
    DiffLine {
        line_type: DiffLineType::Ignored,
        old_line_num: None,
        new_line_num: None,
        content: raw.to_string(),
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let old = self.old_line_num.unwrap_or_default();
        let new = self.new_line_num.unwrap_or_default();
        match self.line_type {
            DiffLineType::Hunk => write!(f, "  --- Diff Hunk: {} ---", self.content),
            DiffLineType::Add => write!(f, "  Line {}: ADDED -> '{}'", new, self.content),
            DiffLineType::Remove => write!(f, "  Line {}: DELETED -> '{}'", old, self.content),
            DiffLineType::Context => {
                write!(f, "  Line {}/{}: CONTEXT -> '{}'", old, new, self.content)
            }
            DiffLineType::Ignored => Ok(()),
        }
    }
}

/// Render a patch as an annotated listing, one output line per diff line.
pub fn render(patch: Option<&str>) -> String {
    let patch = match patch {
        Some(p) if !p.is_empty() => p,
        _ => return NO_PATCH_PLACEHOLDER.to_string(),
    };

    parse_patch(patch)
        .iter()
        .filter(|line| line.line_type != DiffLineType::Ignored)
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
