//! External command execution
//!
//! Every shell-out in kubedev goes through this module. Failure is
//! fail-fast: a non-zero exit becomes a structured error carrying the
//! program name, status and captured stderr, and the caller propagates it.

use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors that can occur while running an external command
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    NonZero {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run a command, inheriting stdout/stderr, and check its exit status.
pub async fn run(program: &str, args: &[String]) -> Result<(), ExecError> {
    run_with_env(program, args, &[]).await
}

/// Run a command with additional environment variables.
pub async fn run_with_env(
    program: &str,
    args: &[String],
    env: &[(&str, String)],
) -> Result<(), ExecError> {
    debug!("exec: {} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    for (key, value) in env {
        cmd.env(key, value);
    }

    let status = cmd.status().await.map_err(|e| ExecError::Spawn {
        program: program.to_string(),
        source: e,
    })?;

    if !status.success() {
        return Err(ExecError::NonZero {
            program: program.to_string(),
            status: status.to_string(),
            stderr: String::new(),
        });
    }
    Ok(())
}

/// Run a command and capture its stdout as a UTF-8 string.
///
/// Stderr is captured as well and surfaced in the error on non-zero exit.
pub async fn run_capture(program: &str, args: &[String]) -> Result<String, ExecError> {
    debug!("exec (capture): {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ExecError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(ExecError::NonZero {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check whether a program is on PATH by asking it for its version.
///
/// Used for preflight diagnostics only; absence is reported, not fatal here.
pub async fn is_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
