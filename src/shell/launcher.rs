//! Fire-and-forget launching of desktop applications.
//!
//! The chat can open a terminal emulator or a browser. Programs are started
//! detached from our stdio; a background thread reaps each one when it
//! exits. Only a failure to spawn is reported back.

use std::process::{Command, Stdio};
use std::thread;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

/// Which auxiliary application to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Terminal,
    Browser,
}

impl LaunchTarget {
    pub fn display_name(&self) -> &'static str {
        match self {
            LaunchTarget::Terminal => "terminal",
            LaunchTarget::Browser => "browser",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    terminal_cmd: String,
    browser_cmd: String,
}

impl Launcher {
    pub fn new(terminal_cmd: impl Into<String>, browser_cmd: impl Into<String>) -> Self {
        Self {
            terminal_cmd: terminal_cmd.into(),
            browser_cmd: browser_cmd.into(),
        }
    }

    pub fn command_for(&self, target: LaunchTarget) -> &str {
        match target {
            LaunchTarget::Terminal => &self.terminal_cmd,
            LaunchTarget::Browser => &self.browser_cmd,
        }
    }

    /// Spawn the program for `target` and return its pid without waiting
    /// for it to finish.
    pub fn launch(&self, target: LaunchTarget) -> Result<u32> {
        let cmdline = self.command_for(target);
        let mut parts = cmdline.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("no {} command configured", target.display_name());
        };

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to launch {} `{}`", target.display_name(), cmdline))?;

        let pid = child.id();
        info!("Launched {} (pid {})", target.display_name(), pid);

        // Reap it once it exits so closed windows don't linger as zombies.
        let name = target.display_name();
        thread::spawn(move || match child.wait() {
            Ok(status) => debug!("{} (pid {}) exited: {}", name, pid, status),
            Err(e) => warn!("Failed to wait for {} (pid {}): {}", name, pid, e),
        });
        Ok(pid)
    }
}
