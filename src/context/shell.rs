//! Best-effort, bounded execution of read-only shell queries.
//!
//! Every query runs in its own `sh -c` subprocess with a short timeout and
//! `kill_on_drop`, and only stdout is captured.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("failed to start: {0}")]
    Spawn(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Run `script` through `sh -c` and return its stdout (lossy UTF-8).
///
/// A non-zero exit is only an error when nothing was printed on stdout;
/// partial output (e.g. `ls` on one missing directory) is still useful.
pub async fn run_query(script: &str, limit: Duration) -> Result<String, QueryError> {
    let mut c = Command::new("sh");
    c.arg("-c").arg(script);
    c.kill_on_drop(true);
    c.stdin(Stdio::null());

    let res = timeout(limit, c.output())
        .await
        .map_err(|_| QueryError::Timeout(limit))?
        .map_err(|e| QueryError::Spawn(e.to_string()))?;

    let stdout = String::from_utf8_lossy(&res.stdout).into_owned();
    if !res.status.success() && stdout.trim().is_empty() {
        let stderr = String::from_utf8_lossy(&res.stderr);
        return Err(QueryError::Failed {
            status: res.status.to_string(),
            stderr: stderr.lines().next().unwrap_or_default().trim().to_string(),
        });
    }
    Ok(stdout)
}

/// Keep at most `max_chars` characters (not bytes).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Keep at most `max_lines` lines, each terminated by a newline.
pub fn truncate_lines(s: &str, max_lines: usize) -> String {
    let mut out = String::new();
    for line in s.lines().take(max_lines) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Single-quote `s` for safe interpolation into an `sh` script.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("ãéîõü", 2), "ãé");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_truncate_lines() {
        let input = "1\n2\n3\n4\n5\n6\n7\n";
        assert_eq!(truncate_lines(input, 5), "1\n2\n3\n4\n5\n");
        assert_eq!(truncate_lines("a\nb", 5), "a\nb\n");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/home/me/Docs"), "'/home/me/Docs'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[tokio::test]
    async fn test_run_query_captures_stdout_only() {
        let out = run_query("echo out; echo err >&2", Duration::from_secs(5)).await.unwrap();
        assert_eq!(out, "out\n");
    }

    #[tokio::test]
    async fn test_run_query_failure_and_timeout() {
        let err = run_query("echo nope >&2; exit 3", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, QueryError::Failed { ref stderr, .. } if stderr == "nope"));

        let err = run_query("sleep 5", Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(err, QueryError::Timeout(Duration::from_millis(100)));
    }
}
