//! Settings for commitview.
//!
//! Settings are read from `~/.config/commitview/config.toml` and then
//! overridden by command line flags. The file is optional.

use crate::cli::Args;
use crate::github::DEFAULT_API_URL;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub output: PathBuf,
    pub timeout_secs: u64,
    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            output: PathBuf::from("changes.txt"),
            timeout_secs: 30,
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl Config {
    /// Command line flags win over the config file
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(api_url) = &args.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(output) = &args.output {
            self.output = output.clone();
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API token from the configured environment variable.
    /// An empty value counts as unset.
    pub fn token(&self) -> Option<SecretString> {
        token_from(std::env::var(&self.token_env).ok())
    }
}

fn token_from(value: Option<String>) -> Option<SecretString> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Returns the path to the config file: `~/.config/commitview/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("commitview").join("config.toml"))
}

/// Load configuration from disk. Returns default if file is missing or invalid.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("ignoring invalid config {}: {}", path.display(), e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
