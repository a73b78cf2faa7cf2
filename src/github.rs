use crate::diff::FileChange;
use crate::error::{FetchError, ResolveError};
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Resolve a repository URL or `owner/repo` path.
///
/// Accepts `https://host/owner/repo[.git][/...]`, `host/owner/repo`,
/// `git@host:owner/repo.git` and bare `owner/repo`.
pub fn resolve_repo(input: &str) -> Result<RepoRef, ResolveError> {
    let input = input.trim();

    let path = if input.contains("://") {
        let url = Url::parse(input).map_err(|e| ResolveError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;
        url.path().to_string()
    } else if let Some((_, path)) = input.strip_prefix("git@").and_then(|s| s.split_once(':')) {
        path.to_string()
    } else {
        // Owner names can't contain dots, so a dotted first segment is a host
        match input.trim_start_matches('/').split_once('/') {
            Some((host, rest)) if host.contains('.') => rest.to_string(),
            _ => input.to_string(),
        }
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [owner, repo, ..] => {
            let repo = repo.strip_suffix(".git").unwrap_or(*repo);
            if repo.is_empty() {
                return Err(ResolveError::MissingSegments(input.to_string()));
            }
            Ok(RepoRef {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })
        }
        _ => Err(ResolveError::MissingSegments(input.to_string())),
    }
}

/// A commit and the files it touched
#[derive(Debug, Clone)]
pub struct CommitDetails {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub files: Vec<FileChange>,
}

impl CommitDetails {
    pub fn short_sha(&self) -> String {
        self.sha.chars().take(7).collect()
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Anything that can look up the changed files of a commit
pub trait CommitSource {
    fn fetch_commit(&self, repo: &RepoRef, commit: &str) -> Result<CommitDetails, FetchError>;
}

/// Client for the GitHub REST API
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Option<SecretString>,
}

impl GitHubClient {
    pub fn new(
        api_url: &str,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let api_url = Url::parse(api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| FetchError::InvalidApiUrl(api_url.to_string()))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    /// `{api_url}/repos/{owner}/{repo}/commits/{commit}`, each segment encoded
    fn commit_url(&self, repo: &RepoRef, commit: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "commits", commit]);
        }
        url
    }
}

impl CommitSource for GitHubClient {
    fn fetch_commit(&self, repo: &RepoRef, commit: &str) -> Result<CommitDetails, FetchError> {
        let url = self.commit_url(repo, commit);
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send()?;
        let status = response.status();
        debug!("{} -> {}", url, status);

        match status.as_u16() {
            404 => return Err(FetchError::NotFound),
            code @ (403 | 429) => return Err(FetchError::Forbidden(code)),
            code if !status.is_success() => return Err(FetchError::Status { code }),
            _ => {}
        }

        let json: serde_json::Value = response.json()?;
        let details = parse_commit(&json, commit)?;
        info!(
            "commit {} in {} touched {} file(s)",
            details.short_sha(),
            repo,
            details.files.len()
        );
        Ok(details)
    }
}

/// Pull the fields we need out of a "get a commit" response
fn parse_commit(json: &serde_json::Value, commit: &str) -> Result<CommitDetails, FetchError> {
    let sha = json["sha"].as_str().unwrap_or(commit).to_string();
    let message = json["commit"]["message"]
        .as_str()
        .unwrap_or("")
        .to_string();
    let author = json["commit"]["author"]["name"]
        .as_str()
        .or_else(|| json["author"]["login"].as_str())
        .unwrap_or("")
        .to_string();

    let files = match json.get("files") {
        Some(files) if !files.is_null() => serde_json::from_value(files.clone())
            .map_err(|e| FetchError::Decode(e.to_string()))?,
        _ => Vec::new(),
    };

    Ok(CommitDetails {
        sha,
        message,
        author,
        files,
    })
}
