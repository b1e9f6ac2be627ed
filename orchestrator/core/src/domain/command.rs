// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

/// Captured result of one shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process could not be spawned or was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(code),
        }
    }

    pub fn is_error(&self) -> bool {
        self.exit_code != Some(0)
    }
}

/// Executes shell commands on the host.
///
/// Implementations never fail: a spawn failure is reported as an errored
/// [`CommandOutput`]. A non-zero exit is logged at error level unless
/// `expect_error` is set, in which case the caller is probing and a failure is
/// an ordinary answer.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn exe(&self, command: &str, expect_error: bool) -> CommandOutput;
}
