//! Environment-sourced configuration.
//!
//! The API key and endpoint are read once at startup into an immutable
//! [`Config`] that is handed to the AI client and the chat controller.
//! A missing value never aborts the process: the chat shows a configuration
//! error and refuses to send until the user fixes the environment.

use std::path::PathBuf;

use thiserror::Error;

pub const ENV_API_KEY: &str = "AI_API_KEY";
pub const ENV_API_ENDPOINT: &str = "AI_API_ENDPOINT";
pub const ENV_MODEL: &str = "AI_MODEL";
pub const ENV_HISTORY_FILE: &str = "AI_CHAT_HISTORY_FILE";
pub const ENV_TERMINAL: &str = "AI_CHAT_TERMINAL";
pub const ENV_BROWSER: &str = "AI_CHAT_BROWSER";

/// Model name sent to OpenAI-compatible endpoints unless `AI_MODEL` is set.
pub const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TERMINAL: &str = "kitty";
const DEFAULT_BROWSER: &str = "firefox";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("AI_API_KEY is empty or not set")]
    MissingApiKey,
    #[error("AI_API_ENDPOINT is empty or not set")]
    MissingEndpoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    /// Explicit history location; `None` means the per-user default.
    pub history_file: Option<PathBuf>,
    pub terminal_cmd: String,
    pub browser_cmd: String,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary lookup so callers (and tests) need not touch
    /// the real environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| clean_value(&v)).unwrap_or_default();
        let non_empty = |name: &str, fallback: &str| {
            let v = read(name);
            if v.is_empty() { fallback.to_string() } else { v }
        };

        let history = read(ENV_HISTORY_FILE);
        Self {
            api_key: read(ENV_API_KEY),
            endpoint: read(ENV_API_ENDPOINT),
            model: non_empty(ENV_MODEL, DEFAULT_MODEL),
            history_file: (!history.is_empty()).then(|| PathBuf::from(history)),
            terminal_cmd: non_empty(ENV_TERMINAL, DEFAULT_TERMINAL),
            browser_cmd: non_empty(ENV_BROWSER, DEFAULT_BROWSER),
        }
    }

    /// Check that both required values are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Trim whitespace and one layer of matching surrounding quotes.
fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}
