// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::boot_state::BootState;
use crate::domain::command::CommandRunner;
use crate::domain::lifecycle::{ConfigureError, NodeConfigurator};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Full first-boot configuration delegated to an external script. The script
/// owns the data-store configuration and records what it decided (deployment
/// type, seed, read-ahead) in the boot state file.
pub struct CommandConfigurator {
    runner: Arc<dyn CommandRunner>,
    command: String,
}

impl CommandConfigurator {
    pub fn new(runner: Arc<dyn CommandRunner>, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
        }
    }
}

#[async_trait]
impl NodeConfigurator for CommandConfigurator {
    async fn configure(&self, _state: &BootState) -> Result<(), ConfigureError> {
        info!("Running first-boot configuration");

        let output = self.runner.exe(&self.command, false).await;
        if output.is_error() {
            return Err(ConfigureError::CommandFailed {
                command: self.command.clone(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
