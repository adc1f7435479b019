//! Disk persistence for the chat transcript.
//!
//! The file is a pretty-printed JSON array of `{"role", "message"}` objects.
//! Only the most recent [`MAX_HISTORY_LENGTH`] turns are written. The
//! in-memory transcript stays authoritative for the session: a corrupt file
//! loads as empty history and a failed write is logged and forgotten.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Maximum number of turns kept on disk.
pub const MAX_HISTORY_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label shown in front of the message in the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI",
        }
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub message: String,
}

impl Turn {
    pub fn user(message: impl Into<String>) -> Self {
        Self { role: Role::User, message: message.into() }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self { role: Role::Assistant, message: message.into() }
    }
}

pub fn default_history_path() -> PathBuf {
    // ~/.config/hyprchat/history.json on Linux; falls back to the cwd when
    // no config dir can be determined.
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hyprchat")
        .join("history.json")
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_len: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), max_len: MAX_HISTORY_LENGTH }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted history. Never fails: anything unreadable yields
    /// an empty history.
    pub fn load(&self) -> Vec<Turn> {
        if !self.path.exists() {
            return Vec::new();
        }
        match load(&self.path) {
            Ok(turns) => {
                info!("Loaded {} turns from {}", turns.len(), self.path.display());
                turns
            }
            Err(e) => {
                warn!("Ignoring unreadable history file: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Persist the tail of `history`. Write errors are logged and swallowed.
    pub fn save(&self, history: &[Turn]) {
        let start = history.len().saturating_sub(self.max_len);
        if let Err(e) = save(&self.path, &history[start..]) {
            warn!("Failed to save chat history: {:#}", e);
        }
    }
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create history directory: {}", parent.display()))?;
    }
    Ok(())
}

fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).with_context(|| format!("Failed to write temp file: {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        format!(
            "Failed to replace {} with {}",
            path.display(),
            tmp.display()
        )
    })?;
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<Vec<Turn>> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let turns: Vec<Turn> =
        serde_json::from_str(&raw).with_context(|| format!("Invalid history JSON at {}", path.display()))?;
    Ok(turns)
}

fn save(path: &Path, turns: &[Turn]) -> anyhow::Result<()> {
    let data = serde_json::to_vec_pretty(turns).context("Failed to serialize history")?;
    write_atomic(path, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn numbered(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| if i % 2 == 0 { Turn::user(format!("q{i}")) } else { Turn::assistant(format!("a{i}")) })
            .collect()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("none.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json ]").unwrap();

        let store = HistoryStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_keeps_last_twenty_in_order() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        let history = numbered(25);

        store.save(&history);
        let loaded = store.load();

        assert_eq!(loaded.len(), MAX_HISTORY_LENGTH);
        assert_eq!(loaded, history[5..].to_vec());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("history.json");
        let store = HistoryStore::new(&path);

        store.save(&numbered(3));

        assert!(path.exists());
        assert_eq!(store.load().len(), 3);
    }

    #[test]
    fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store.save(&[Turn::user("hello"), Turn::assistant("hi there")]);

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                { "role": "user", "message": "hello" },
                { "role": "assistant", "message": "hi there" }
            ])
        );
        // pretty-printed
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = HistoryStore::new(blocker.join("history.json"));

        store.save(&numbered(2));
        assert!(store.load().is_empty());
    }
}
