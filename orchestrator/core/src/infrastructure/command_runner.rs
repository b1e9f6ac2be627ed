// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::command::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::process::Stdio;
use tracing::{debug, error, info};

/// Runs commands through `sh -c`, capturing stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn exe(&self, command: &str, expect_error: bool) -> CommandOutput {
        info!("Executing: {}", command);

        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match cmd.output().await {
            Ok(output) => CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                exit_code: output.status.code(),
            },
            Err(e) => CommandOutput {
                stdout: String::new(),
                stderr: format!("failed to spawn: {}", e),
                exit_code: None,
            },
        };

        if !output.stdout.trim().is_empty() {
            debug!("{} stdout: {}", command, output.stdout.trim_end());
        }

        if output.is_error() {
            if expect_error {
                debug!("{} exited with {:?} (expected)", command, output.exit_code);
            } else {
                error!(
                    "Command `{}` failed with {:?}: {}",
                    command,
                    output.exit_code,
                    output.stderr.trim_end()
                );
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_on_success() {
        let output = ShellCommandRunner::new().exe("echo ready", false).await;

        assert!(!output.is_error());
        assert_eq!(output.stdout.trim(), "ready");
    }

    #[tokio::test]
    async fn test_non_zero_exit_sets_error_flag() {
        let output = ShellCommandRunner::new().exe("echo nope >&2; exit 3", true).await;

        assert!(output.is_error());
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr.trim(), "nope");
    }
}
