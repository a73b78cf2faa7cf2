use thiserror::Error;

/// Failure to turn operator input into an owner/repo pair
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("could not parse '{url}' as a URL: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not parse owner and repo from URL: {0}")]
    MissingSegments(String),
}

/// Failure talking to the hosting API
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository or commit not found")]
    NotFound,
    #[error("access forbidden (HTTP {0})")]
    Forbidden(u16),
    #[error("unexpected HTTP status {code}")]
    Status { code: u16 },
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("could not decode commit response: {0}")]
    Decode(String),
    #[error("invalid API URL '{0}'")]
    InvalidApiUrl(String),
}

impl FetchError {
    /// Extra guidance shown to the operator under the error line
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FetchError::NotFound => {
                Some("Repository or Commit ID not found. Please check the URL and commit ID.")
            }
            FetchError::Forbidden(_) => Some(
                "Forbidden. This might be due to rate limits or insufficient token permissions.",
            ),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Rejected file selection; the operator is asked again
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid input. Please enter numbers separated by commas, 'all', or 'q'.")]
    InvalidNumber(String),
    /// Carries the out-of-range numbers that were dropped
    #[error("No valid files selected. Please try again.")]
    NothingSelected(Vec<String>),
}
