//! Desktop context capture for AI prompts.
//!
//! A snapshot asks the window manager for the open windows and the active
//! workspace and lists the most recently touched files. Each section is
//! truncated so the prompt stays small, and a failing query is reported
//! inline in its section instead of failing the whole snapshot.

mod shell;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

pub use shell::{run_query, shell_quote, truncate_chars, truncate_lines, QueryError};

/// Characters kept from the window list.
pub const WINDOWS_MAX_CHARS: usize = 500;
/// Characters kept from the active workspace description.
pub const WORKSPACE_MAX_CHARS: usize = 300;
/// Lines kept from the recent-files listing.
pub const RECENT_FILES_MAX_LINES: usize = 5;

/// How much output of a section survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Chars(usize),
    Lines(usize),
}

impl Budget {
    fn apply(&self, output: &str) -> String {
        match *self {
            Budget::Chars(n) => truncate_chars(output, n).to_string(),
            Budget::Lines(n) => truncate_lines(output, n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSection {
    pub title: &'static str,
    pub command: String,
    pub budget: Budget,
}

#[derive(Debug, Clone)]
pub struct ContextCollector {
    windows: ContextSection,
    workspace: ContextSection,
    recent_files: ContextSection,
    query_timeout: Duration,
}

impl Default for ContextCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextCollector {
    const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

    /// Hyprland queries plus a listing of the documents and downloads dirs.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let documents = dirs::document_dir().unwrap_or_else(|| home.join("Documents"));
        let downloads = dirs::download_dir().unwrap_or_else(|| home.join("Downloads"));
        let recent = recent_files_command(&documents, &downloads);

        Self::with_commands("hyprctl clients -j", "hyprctl activeworkspace -j", &recent)
    }

    pub fn with_commands(windows: &str, workspace: &str, recent_files: &str) -> Self {
        Self {
            windows: ContextSection {
                title: "Open windows",
                command: windows.to_string(),
                budget: Budget::Chars(WINDOWS_MAX_CHARS),
            },
            workspace: ContextSection {
                title: "Active workspace",
                command: workspace.to_string(),
                budget: Budget::Chars(WORKSPACE_MAX_CHARS),
            },
            recent_files: ContextSection {
                title: "Recent files",
                command: recent_files.to_string(),
                budget: Budget::Lines(RECENT_FILES_MAX_LINES),
            },
            query_timeout: Self::DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Capture the three sections concurrently and join them under headers.
    pub async fn snapshot(&self) -> String {
        let (windows, workspace, recent) = tokio::join!(
            self.capture(&self.windows),
            self.capture(&self.workspace),
            self.capture(&self.recent_files),
        );

        format!(
            "{}:\n{}\n\n{}:\n{}\n\n{}:\n{}",
            self.windows.title,
            windows,
            self.workspace.title,
            workspace,
            self.recent_files.title,
            recent,
        )
    }

    async fn capture(&self, section: &ContextSection) -> String {
        match run_query(&section.command, self.query_timeout).await {
            Ok(output) => {
                debug!("{}: captured {} bytes", section.title, output.len());
                section.budget.apply(&output)
            }
            Err(e) => {
                warn!("Context query `{}` failed: {}", section.command, e);
                format!("[Error getting context]: {e}")
            }
        }
    }
}

/// Newest entries of both directories. Missing directories give an empty
/// listing rather than an error.
fn recent_files_command(documents: &Path, downloads: &Path) -> String {
    format!(
        "ls -lt {} {} 2>/dev/null | head -n {}",
        shell_quote(&documents.to_string_lossy()),
        shell_quote(&downloads.to_string_lossy()),
        RECENT_FILES_MAX_LINES,
    )
}
