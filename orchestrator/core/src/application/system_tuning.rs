// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Host tuning re-applied on every boot. Each command stands alone: a failed
//! mount does not stop swap from being disabled.

use crate::domain::boot_state::BootState;
use crate::domain::command::CommandRunner;
use crate::domain::node_config::TuningConfig;
use std::sync::Arc;
use tracing::info;

pub struct SystemTuner {
    runner: Arc<dyn CommandRunner>,
    config: TuningConfig,
}

impl SystemTuner {
    pub fn new(runner: Arc<dyn CommandRunner>, config: TuningConfig) -> Self {
        Self { runner, config }
    }

    pub async fn apply(&self, state: &BootState) {
        info!("Deployment type: {}", state.deployment_type);

        // Mount all attached drives
        self.runner.exe("sudo mount -a", false).await;

        self.runner.exe("sudo swapoff --all", false).await;

        // Read-ahead sometimes resets after a restart
        if let Some(readahead) = state.raid_readahead {
            let command = format!("sudo blockdev --setra {} {}", readahead, self.config.raid_device);
            self.runner.exe(&command, true).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::CommandOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FailingRunner {
        commands: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl CommandRunner for FailingRunner {
        async fn exe(&self, command: &str, expect_error: bool) -> CommandOutput {
            self.commands.lock().unwrap().push((command.to_string(), expect_error));
            CommandOutput::failure(32, "mount: failed")
        }
    }

    #[tokio::test]
    async fn test_readahead_only_when_configured() {
        let runner = Arc::new(FailingRunner::default());
        let tuner = SystemTuner::new(runner.clone(), TuningConfig::default());

        tuner.apply(&BootState::default()).await;

        let commands: Vec<String> = runner.commands.lock().unwrap().iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(commands, vec!["sudo mount -a", "sudo swapoff --all"]);
    }

    #[tokio::test]
    async fn test_each_command_runs_despite_failures() {
        let runner = Arc::new(FailingRunner::default());
        let tuner = SystemTuner::new(runner.clone(), TuningConfig::default());
        let state = BootState {
            raid_readahead: Some(128),
            ..BootState::default()
        };

        tuner.apply(&state).await;

        let commands = runner.commands.lock().unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[2],
            ("sudo blockdev --setra 128 /dev/md0".to_string(), true)
        );
    }
}
