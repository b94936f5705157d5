//! External-process invocation.
//!
//! Every step of the pipeline is a blocking shell-out to an external tool
//! (git, apt, cmake). Two modes are provided: `run` streams the tool's own
//! output through to the terminal (builds can take an hour, the user wants
//! to see compiler progress), while `run_capture` collects stdout for
//! parsing (the apt package listing).
//!
//! No timeouts are applied; if the external tool hangs, so does the run.

use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors from invoking an external tool.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The process could not be spawned at all (binary missing, cwd gone).
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The process ran and exited non-zero (or was killed by a signal).
  #[error("'{program}' exited with {}", code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
  Failed { program: String, code: Option<i32> },
}

impl ExecError {
  /// Exit status to mirror when this failure aborts the run.
  ///
  /// Signal deaths carry no code and map to 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      ExecError::Failed { code: Some(c), .. } => *c,
      _ => 1,
    }
  }
}

/// Run an external tool, inheriting stdout/stderr, and wait for it to exit.
///
/// Fails if the process cannot be spawned or exits non-zero.
pub async fn run(program: &str, args: &[&str], cwd: &Path) -> Result<(), ExecError> {
  info!(program, ?args, cwd = %cwd.display(), "running");

  let status = Command::new(program)
    .args(args)
    .current_dir(cwd)
    .status()
    .await
    .map_err(|e| ExecError::Spawn {
      program: program.to_string(),
      source: e,
    })?;

  if !status.success() {
    return Err(ExecError::Failed {
      program: program.to_string(),
      code: status.code(),
    });
  }

  Ok(())
}

/// Run an external tool and capture its stdout as UTF-8 text.
///
/// Only stdout is captured; stderr streams through to the terminal so the
/// tool's own diagnostics stay visible when it fails. Fails if the process
/// cannot be spawned or exits non-zero.
pub async fn run_capture(program: &str, args: &[&str], cwd: &Path) -> Result<String, ExecError> {
  debug!(program, ?args, cwd = %cwd.display(), "running (captured)");

  let output = Command::new(program)
    .args(args)
    .current_dir(cwd)
    .stdout(Stdio::piped())
    .stderr(Stdio::inherit())
    .output()
    .await
    .map_err(|e| ExecError::Spawn {
      program: program.to_string(),
      source: e,
    })?;

  if !output.status.success() {
    return Err(ExecError::Failed {
      program: program.to_string(),
      code: output.status.code(),
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn run_success() {
    let temp = TempDir::new().unwrap();
    run("true", &[], temp.path()).await.unwrap();
  }

  #[tokio::test]
  async fn run_failure_carries_exit_code() {
    let temp = TempDir::new().unwrap();
    let err = run("false", &[], temp.path()).await.unwrap_err();
    assert!(matches!(err, ExecError::Failed { code: Some(1), .. }));
    assert_eq!(err.exit_code(), 1);
  }

  #[tokio::test]
  async fn run_missing_binary_is_spawn_error() {
    let temp = TempDir::new().unwrap();
    let err = run("rootup-no-such-tool", &[], temp.path()).await.unwrap_err();
    assert!(matches!(err, ExecError::Spawn { .. }));
    assert_eq!(err.exit_code(), 1);
  }

  #[tokio::test]
  async fn run_capture_collects_stdout() {
    let temp = TempDir::new().unwrap();
    let out = run_capture("echo", &["hello"], temp.path()).await.unwrap();
    assert_eq!(out.trim(), "hello");
  }

  #[tokio::test]
  async fn run_capture_takes_stdout_only() {
    // Stderr is not captured into the result; it belongs to the terminal.
    let temp = TempDir::new().unwrap();
    let out = run_capture("sh", &["-c", "echo out; echo err >&2"], temp.path())
      .await
      .unwrap();
    assert_eq!(out.trim(), "out");
  }

  #[tokio::test]
  async fn run_capture_failure() {
    let temp = TempDir::new().unwrap();
    let err = run_capture("false", &[], temp.path()).await.unwrap_err();
    assert!(matches!(err, ExecError::Failed { code: Some(1), .. }));
  }

  #[tokio::test]
  async fn run_respects_cwd() {
    let temp = TempDir::new().unwrap();
    run("touch", &["marker"], temp.path()).await.unwrap();
    assert!(temp.path().join("marker").exists());
  }
}
