use clap::{CommandFactory, Parser, ValueHint};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// commitview - write a line-numbered report of the files changed in a commit
#[derive(Parser, Debug)]
#[command(name = "commitview", version, about, long_about = None)]
pub struct Args {
    /// Repository URL or owner/repo path.
    /// Prompted for when omitted.
    #[arg(value_hint = ValueHint::Url)]
    pub repo: Option<String>,

    /// Commit SHA (or any ref the API accepts).
    /// Prompted for when omitted.
    #[arg(value_hint = ValueHint::Other)]
    pub commit: Option<String>,

    /// Report file to write (default: changes.txt)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Base URL of the hosting API
    #[arg(long, value_hint = ValueHint::Url)]
    pub api_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Generate shell completions
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}

/// Generate shell completions to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    generate(shell, &mut cmd, "commitview", &mut io::stdout());
}
