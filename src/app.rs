use crate::cli::Args;
use crate::config::Config;
use crate::error::{FetchError, SelectionError};
use crate::github::{resolve_repo, CommitDetails, CommitSource, GitHubClient, RepoRef};
use crate::report::ReportWriter;
use crate::selection::{parse_selection, Selection};
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{self, BufRead, Stdout, StdinLock, Write};

const SELECTION_PROMPT: &str =
    "\nEnter the numbers of files you want to view (e.g., 1,3,5) or 'all' for all files, or 'q' to quit: ";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Report written with this many file sections
    Written(usize),
    /// The commit has no changed files
    NoChanges,
    /// Operator quit at the selection prompt
    Quit,
    /// Bad input or a failed request; already reported to the operator
    Aborted,
}

pub struct App<S, R, W> {
    source: S,
    config: Config,
    input: R,
    out: W,
    /// No API token configured; warned about before fetching
    anonymous: bool,
}

impl App<GitHubClient, StdinLock<'static>, Stdout> {
    /// Interactive app talking to the configured API over stdin/stdout
    pub fn new(config: Config) -> Result<Self> {
        let token = config.token();
        let anonymous = token.is_none();

        let source = GitHubClient::new(&config.api_url, token, config.timeout())
            .context("Failed to create HTTP client")?;

        let mut app = Self::with_io(source, config, io::stdin().lock(), io::stdout());
        app.anonymous = anonymous;
        Ok(app)
    }
}

impl<S: CommitSource, R: BufRead, W: Write> App<S, R, W> {
    pub fn with_io(source: S, config: Config, input: R, out: W) -> Self {
        Self {
            source,
            config,
            input,
            out,
            anonymous: false,
        }
    }

    /// Run once: ask for what's missing, fetch, select, write the report.
    pub fn run(&mut self, args: &Args) -> Result<RunOutcome> {
        writeln!(self.out, "GitHub Commit Change Viewer")?;
        writeln!(self.out, "----------------------------")?;

        let repo_url = match &args.repo {
            Some(repo) => repo.trim().to_string(),
            None => self
                .prompt("Enter GitHub repository URL (e.g., https://github.com/octocat/Spoon-Knife): ")?
                .unwrap_or_default(),
        };
        let commit = match &args.commit {
            Some(commit) => commit.trim().to_string(),
            None => self.prompt("Enter commit ID (SHA): ")?.unwrap_or_default(),
        };

        if repo_url.is_empty() || commit.is_empty() {
            writeln!(self.out, "Repository URL and Commit ID cannot be empty.")?;
            return Ok(RunOutcome::Aborted);
        }

        let repo = match resolve_repo(&repo_url) {
            Ok(repo) => repo,
            Err(e) => {
                writeln!(self.out, "Error: {}", e)?;
                return Ok(RunOutcome::Aborted);
            }
        };

        writeln!(
            self.out,
            "\nFetching changes for commit '{}' in '{}'...",
            commit, repo
        )?;
        if self.anonymous {
            writeln!(
                self.out,
                "Warning: {} not set. Rate limits might be hit quickly for unauthenticated requests.",
                self.config.token_env
            )?;
        }

        let details = match self.source.fetch_commit(&repo, &commit) {
            Ok(details) => details,
            Err(e) => {
                self.report_fetch_error(&e)?;
                return Ok(RunOutcome::Aborted);
            }
        };

        self.process_commit(&repo, &commit, details)
    }

    fn process_commit(
        &mut self,
        repo: &RepoRef,
        commit: &str,
        mut details: CommitDetails,
    ) -> Result<RunOutcome> {
        if details.files.is_empty() {
            writeln!(self.out, "No file changes found for commit '{}'.", commit)?;
            return Ok(RunOutcome::NoChanges);
        }

        details.files.sort_by(|a, b| a.filename.cmp(&b.filename));

        if !details.summary().is_empty() {
            writeln!(
                self.out,
                "\nCommit {}: {} ({})",
                details.short_sha(),
                details.summary(),
                details.author
            )?;
        }
        writeln!(self.out, "\n--- Files changed in Commit {} ---", commit)?;
        for (i, file) in details.files.iter().enumerate() {
            writeln!(
                self.out,
                "{}. {} (Status: {}) +{} -{}",
                i + 1,
                file.filename,
                file.status,
                file.additions,
                file.deletions
            )?;
        }

        let indices = match self.select_files(details.files.len())? {
            Some(indices) => indices,
            None => {
                writeln!(self.out, "Exiting without saving changes.")?;
                return Ok(RunOutcome::Quit);
            }
        };

        let path = self.config.output.clone();
        writeln!(
            self.out,
            "\nWriting selected changes to '{}'...",
            path.display()
        )?;

        let mut report = ReportWriter::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        report.write_title(repo, commit)?;
        for (position, &idx) in indices.iter().enumerate() {
            let file = &details.files[idx];
            debug!("rendering {}", file.filename);
            report
                .write_file(position + 1, indices.len(), file)
                .with_context(|| format!("Failed to write {} to report", file.filename))?;
        }
        report
            .finish()
            .with_context(|| format!("Failed to flush {}", path.display()))?;

        info!("wrote {} section(s) to {}", indices.len(), path.display());
        writeln!(
            self.out,
            "\nSuccessfully wrote selected changes to '{}'.",
            path.display()
        )?;
        Ok(RunOutcome::Written(indices.len()))
    }

    /// Ask until the operator picks at least one file. `None` means quit.
    fn select_files(&mut self, file_count: usize) -> Result<Option<Vec<usize>>> {
        loop {
            let Some(input) = self.prompt(SELECTION_PROMPT)? else {
                return Ok(None);
            };

            match parse_selection(&input, file_count) {
                Ok(Selection::Quit) => return Ok(None),
                Ok(Selection::Files { indices, skipped }) => {
                    self.warn_skipped(&skipped)?;
                    return Ok(Some(indices));
                }
                Err(e) => {
                    if let SelectionError::NothingSelected(skipped) = &e {
                        self.warn_skipped(skipped)?;
                    }
                    writeln!(self.out, "{}", e)?;
                }
            }
        }
    }

    fn warn_skipped(&mut self, skipped: &[String]) -> io::Result<()> {
        for number in skipped {
            writeln!(
                self.out,
                "Warning: File number {} is out of range. Skipping.",
                number
            )?;
        }
        Ok(())
    }

    fn report_fetch_error(&mut self, e: &FetchError) -> io::Result<()> {
        writeln!(self.out, "Error fetching commit details: {}", e)?;
        if let Some(hint) = e.hint() {
            writeln!(self.out, "  {}", hint)?;
        }
        Ok(())
    }

    /// Print `message` and read one trimmed line. `None` on end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.out, "{}", message)?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{FileChange, FileStatus};
    use clap::Parser;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::Path;

    struct StubSource {
        respond: fn() -> Result<CommitDetails, FetchError>,
        calls: RefCell<Vec<(RepoRef, String)>>,
    }

    impl StubSource {
        fn new(respond: fn() -> Result<CommitDetails, FetchError>) -> Self {
            Self {
                respond,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommitSource for StubSource {
        fn fetch_commit(&self, repo: &RepoRef, commit: &str) -> Result<CommitDetails, FetchError> {
            self.calls
                .borrow_mut()
                .push((repo.clone(), commit.to_string()));
            (self.respond)()
        }
    }

    fn file(name: &str, status: &str, patch: Option<&str>) -> FileChange {
        FileChange {
            filename: name.to_string(),
            status: FileStatus::from(status.to_string()),
            previous_filename: None,
            patch: patch.map(str::to_string),
            additions: 1,
            deletions: 1,
        }
    }

    fn commit(files: Vec<FileChange>) -> CommitDetails {
        CommitDetails {
            sha: "abc123def".to_string(),
            message: "Update readme".to_string(),
            author: "The Octocat".to_string(),
            files,
        }
    }

    fn readme_commit() -> Result<CommitDetails, FetchError> {
        Ok(commit(vec![file(
            "README.md",
            "modified",
            Some("@@ -1,2 +1,2 @@\n-old line\n+new line\n context"),
        )]))
    }

    fn two_file_commit() -> Result<CommitDetails, FetchError> {
        Ok(commit(vec![
            file("src/main.rs", "added", Some("@@ -0,0 +1 @@\n+fn main() {}")),
            file("README.md", "removed", Some("@@ -1 +0,0 @@\n-# Title")),
        ]))
    }

    fn run_app(
        source: &StubSource,
        output: &Path,
        args: &[&str],
        input: &str,
    ) -> (RunOutcome, String) {
        let config = Config {
            output: output.to_path_buf(),
            ..Config::default()
        };
        let args = Args::parse_from(std::iter::once("commitview").chain(args.iter().copied()));
        let mut app = App::with_io(source, config, Cursor::new(input.to_string()), Vec::new());
        let outcome = app.run(&args).unwrap();
        (outcome, String::from_utf8(app.out).unwrap())
    }

    impl<T: CommitSource> CommitSource for &T {
        fn fetch_commit(&self, repo: &RepoRef, commit: &str) -> Result<CommitDetails, FetchError> {
            (**self).fetch_commit(repo, commit)
        }
    }

    #[test]
    fn test_end_to_end_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(readme_commit);

        let (outcome, out) = run_app(
            &source,
            &path,
            &[],
            "https://github.com/octocat/Spoon-Knife\nabc123\n1\n",
        );

        assert_eq!(outcome, RunOutcome::Written(1));
        assert_eq!(
            source.calls.borrow()[0],
            (
                RepoRef {
                    owner: "octocat".to_string(),
                    repo: "Spoon-Knife".to_string()
                },
                "abc123".to_string()
            )
        );
        assert!(out.contains("1. README.md (Status: modified) +1 -1"));
        assert!(out.contains("Successfully wrote selected changes"));

        let report = std::fs::read_to_string(&path).unwrap();
        assert!(report.starts_with("--- Changes for Commit abc123 in octocat/Spoon-Knife ---"));
        assert!(report.contains("File 1/1: README.md (Status: modified)"));
        assert!(report.contains("Line 1: DELETED -> 'old line'"));
        assert!(report.contains("Line 1: ADDED -> 'new line'"));
        assert!(report.contains("Line 2/2: CONTEXT -> 'context'"));
    }

    #[test]
    fn test_args_skip_prompts_and_files_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let source = StubSource::new(two_file_commit);

        let (outcome, out) = run_app(&source, &path, &["octocat/Spoon-Knife", "abc123"], "all\n");

        assert_eq!(outcome, RunOutcome::Written(2));
        assert!(!out.contains("Enter GitHub repository URL"));
        assert!(out.contains("1. README.md"));
        assert!(out.contains("2. src/main.rs"));

        let report = std::fs::read_to_string(&path).unwrap();
        let readme = report.find("File 1/2: README.md (Status: removed)").unwrap();
        let main = report.find("File 2/2: src/main.rs (Status: added)").unwrap();
        assert!(readme < main);
        assert!(report.contains("  This file was removed."));
        assert!(report.contains("  Line 1: ADDED -> 'fn main() {}'"));
        assert_eq!(report.matches(&"=".repeat(80)).count(), 2);
    }

    #[test]
    fn test_invalid_selection_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(two_file_commit);

        let (outcome, out) = run_app(
            &source,
            &path,
            &["octocat/Spoon-Knife", "abc123"],
            "one\n9\n2,9\n",
        );

        assert_eq!(outcome, RunOutcome::Written(1));
        assert!(out.contains("Invalid input. Please enter numbers separated by commas"));
        assert!(out.contains("No valid files selected. Please try again."));
        assert_eq!(
            out.matches("Warning: File number 9 is out of range. Skipping.")
                .count(),
            2
        );

        let report = std::fs::read_to_string(&path).unwrap();
        assert!(report.contains("File 1/1: src/main.rs"));
        assert!(!report.contains("README.md"));
    }

    #[test]
    fn test_quit_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(readme_commit);

        let (outcome, out) = run_app(&source, &path, &["octocat/Spoon-Knife", "abc123"], "q\n");

        assert_eq!(outcome, RunOutcome::Quit);
        assert!(out.contains("Exiting without saving changes."));
        assert!(!path.exists());
    }

    #[test]
    fn test_end_of_input_at_selection_quits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(readme_commit);

        let (outcome, _) = run_app(&source, &path, &["octocat/Spoon-Knife", "abc123"], "");

        assert_eq!(outcome, RunOutcome::Quit);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_token_warning_follows_fetch_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(readme_commit);
        let config = Config {
            output: path.clone(),
            ..Config::default()
        };
        let args = Args::parse_from(["commitview", "octocat/Spoon-Knife", "abc123"]);
        let mut app = App::with_io(&source, config, Cursor::new("q\n".to_string()), Vec::new());
        app.anonymous = true;

        assert_eq!(app.run(&args).unwrap(), RunOutcome::Quit);
        let out = String::from_utf8(app.out).unwrap();
        let banner = out.find("GitHub Commit Change Viewer").unwrap();
        let fetching = out.find("Fetching changes for commit 'abc123'").unwrap();
        let warning = out
            .find("Warning: GITHUB_TOKEN not set. Rate limits might be hit quickly")
            .unwrap();
        assert!(banner < fetching);
        assert!(fetching < warning);
    }

    #[test]
    fn test_authenticated_run_has_no_token_warning() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource::new(readme_commit);

        let (_, out) = run_app(
            &source,
            &dir.path().join("changes.txt"),
            &["octocat/Spoon-Knife", "abc123"],
            "q\n",
        );

        assert!(!out.contains("not set"));
    }

    #[test]
    fn test_fetch_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(|| Err(FetchError::NotFound));

        let (outcome, out) = run_app(&source, &path, &["octocat/Spoon-Knife", "abc123"], "");

        assert_eq!(outcome, RunOutcome::Aborted);
        assert!(out.contains("Error fetching commit details: repository or commit not found"));
        assert!(out.contains("Please check the URL and commit ID."));
        assert!(!path.exists());
    }

    #[test]
    fn test_no_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(|| Ok(commit(Vec::new())));

        let (outcome, out) = run_app(&source, &path, &["octocat/Spoon-Knife", "abc123"], "");

        assert_eq!(outcome, RunOutcome::NoChanges);
        assert!(out.contains("No file changes found for commit 'abc123'."));
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_url_never_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(readme_commit);

        let (outcome, out) = run_app(&source, &path, &[], "https://github.com/octocat\nabc123\n");

        assert_eq!(outcome, RunOutcome::Aborted);
        assert!(out.contains("Error: could not parse owner and repo"));
        assert!(source.calls.borrow().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_commit_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.txt");
        let source = StubSource::new(readme_commit);

        let (outcome, out) = run_app(&source, &path, &[], "octocat/Spoon-Knife\n   \n");

        assert_eq!(outcome, RunOutcome::Aborted);
        assert!(out.contains("Repository URL and Commit ID cannot be empty."));
        assert!(source.calls.borrow().is_empty());
    }
}
