// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::lifecycle::{DetachedLaunch, FollowOnLauncher};
use std::process::Stdio;
use tracing::{debug, warn};

/// Starts a shell command in the background and walks away.
///
/// The child is reaped by a detached task whose handle is dropped immediately;
/// it keeps running if this process exits first.
pub struct DetachedCommandLauncher {
    command: String,
}

impl DetachedCommandLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl FollowOnLauncher for DetachedCommandLauncher {
    fn launch(&self) -> DetachedLaunch {
        let spawned = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn();

        match spawned {
            Ok(mut child) => {
                let command = self.command.clone();
                tokio::spawn(async move {
                    let status = child.wait().await;
                    debug!("Follow-on `{}` finished: {:?}", command, status);
                });
            }
            // Nobody observes the launch, so this log line is the only trace
            Err(e) => warn!("Could not start follow-on `{}`: {}", self.command, e),
        }

        DetachedLaunch {
            description: self.command.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_launch_returns_before_command_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");
        let launcher = DetachedCommandLauncher::new(format!(
            "sleep 0.2 && touch {}",
            marker.display()
        ));

        let launch = launcher.launch();

        assert!(launch.description.contains("sleep 0.2"));
        assert!(!marker.exists());

        for _ in 0..50 {
            if marker.exists() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("follow-on command never ran");
    }

    #[tokio::test]
    async fn test_failing_command_is_invisible_to_caller() {
        let launch = DetachedCommandLauncher::new("exit 7").launch();
        assert_eq!(launch.description, "exit 7");
    }
}
