// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Boot state inspection

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use nodeboot_core::domain::boot_state::{BootState, BootStateStore};
use nodeboot_core::domain::node_config::BootstrapConfigManifest;
use nodeboot_core::infrastructure::state_store::FileBootStateStore;

#[derive(Subcommand)]
pub enum StateCommand {
    /// Print the persisted boot state
    Show {
        /// Read this state file instead of the configured one
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Print raw YAML
        #[arg(long)]
        yaml: bool,
    },
}

pub async fn handle_command(command: StateCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        StateCommand::Show { file, yaml } => show(config_override, file, yaml).await,
    }
}

async fn show(config_override: Option<PathBuf>, file: Option<PathBuf>, yaml: bool) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => {
            BootstrapConfigManifest::load_or_default(config_override)
                .context("Failed to load configuration")?
                .spec
                .state_file
        }
    };

    let store = FileBootStateStore::new(path);
    let state = store
        .load()
        .await
        .with_context(|| format!("Failed to read boot state from {:?}", store.path()))?;

    if yaml {
        print!("{}", serde_yaml::to_string(&state)?);
        return Ok(());
    }

    println!("{} {}", "Boot state:".bold(), store.path().display());
    for line in summarize(&state) {
        println!("  {}", line);
    }

    Ok(())
}

fn summarize(state: &BootState) -> Vec<String> {
    let mut lines = vec![
        format!("Has run before: {}", state.has_run_before),
        format!("Deployment type: {}", state.deployment_type),
        format!(
            "Leading seed: {}",
            state
                .leading_seed
                .map(|seed| seed.to_string())
                .unwrap_or_else(|| "(none)".to_string())
        ),
    ];

    match state.first_boot_completed_at {
        Some(at) if state.completed_first_boot => {
            lines.push(format!("First boot completed: {}", at.to_rfc3339()))
        }
        _ => lines.push(format!(
            "First boot completed: {}",
            state.completed_first_boot
        )),
    }

    if let Some(readahead) = state.raid_readahead {
        lines.push(format!("RAID read-ahead: {}", readahead));
    }

    if let Some(error) = &state.last_error {
        lines.push(format!("Last error: {}", error.red()));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeboot_core::domain::boot_state::DeploymentType;

    #[test]
    fn test_summary_of_fresh_state() {
        let lines = summarize(&BootState::default());

        assert!(lines.contains(&"Has run before: false".to_string()));
        assert!(lines.contains(&"Leading seed: (none)".to_string()));
        assert!(lines.contains(&"First boot completed: false".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Last error")));
    }

    #[test]
    fn test_summary_of_configured_state() {
        let state = BootState {
            has_run_before: true,
            deployment_type: DeploymentType::Enterprise,
            leading_seed: Some("10.0.0.5".parse().unwrap()),
            raid_readahead: Some(512),
            last_error: Some("configure failed".to_string()),
            ..Default::default()
        };

        let lines = summarize(&state);

        assert!(lines.contains(&"Leading seed: 10.0.0.5".to_string()));
        assert!(lines.contains(&"RAID read-ahead: 512".to_string()));
        assert!(lines.iter().any(|l| l.contains("configure failed")));
    }

    #[tokio::test]
    async fn test_show_missing_file_prints_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.yaml");

        show(None, Some(path), true).await.unwrap();
    }
}
