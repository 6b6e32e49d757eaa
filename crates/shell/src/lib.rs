// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Minimal external-process runner.
//!
//! Used by `odc-deploy`'s resource-plugin adapter (§4.3, invoke a
//! registered plugin executable and read its stdout) and by
//! `odc-topology`'s `TopologySource::Script` resolution (§4.2, invoke a
//! script that emits a topology document on stdout). Both callers need the
//! same shape: spawn, feed stdin, collect stdout/stderr under a deadline,
//! surface the exit status.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Errors from spawning or waiting on an external process.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not complete within {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },
    #[error("failed to write stdin to {program}: {source}")]
    Stdin {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait on {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a completed process run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run `program` with `args`, writing `stdin` (if any) and returning once
/// the process exits or `deadline` elapses, whichever comes first.
pub async fn run(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    stdin: Option<&str>,
    deadline: Duration,
) -> Result<RunOutput, RunError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes())
                .await
                .map_err(|source| RunError::Stdin {
                    program: program.to_string(),
                    source,
                })?;
        }
    } else {
        drop(child.stdin.take());
    }

    let wait = timeout(deadline, child.wait_with_output());
    let output = match wait.await {
        Ok(res) => res.map_err(|source| RunError::Wait {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(RunError::Timeout {
                program: program.to_string(),
                timeout_ms: deadline.as_millis() as u64,
            })
        }
    };

    Ok(RunOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
