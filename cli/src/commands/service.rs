// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! systemd registration so the sequence runs once per machine boot

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

const SERVICE_TEMPLATE: &str = include_str!("../../templates/nodeboot.service");
const SERVICE_PATH: &str = "/etc/systemd/system/nodeboot.service";
const UNIT_NAME: &str = "nodeboot";

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Install and enable the boot-time oneshot unit
    Install {
        /// Path to the nodeboot binary (default: this executable)
        #[arg(long, value_name = "PATH")]
        binary: Option<PathBuf>,
    },

    /// Disable and remove the unit
    Uninstall,
}

pub async fn handle_command(
    command: ServiceCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ServiceCommand::Install { binary } => install(binary, config_override).await,
        ServiceCommand::Uninstall => uninstall().await,
    }
}

/// Renders the unit; an explicit config path is pinned into `ExecStart`.
pub fn render_unit(binary: &Path, config: Option<&Path>) -> String {
    let mut exec_start = binary.display().to_string();
    if let Some(config) = config {
        exec_start.push_str(&format!(" --config {}", config.display()));
    }
    SERVICE_TEMPLATE.replace("{{EXEC_START}}", &exec_start)
}

async fn install(binary_path: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    info!("Installing systemd unit");

    let binary = match binary_path {
        Some(path) => path,
        None => std::env::current_exe().context("Failed to locate current executable")?,
    };

    if !binary.exists() {
        anyhow::bail!("Binary not found: {:?}", binary);
    }

    let unit = render_unit(&binary, config.as_deref());
    std::fs::write(SERVICE_PATH, unit)
        .with_context(|| format!("Failed to write service file: {}", SERVICE_PATH))?;

    println!(
        "{}",
        format!("✓ Service file created: {}", SERVICE_PATH).green()
    );

    systemctl(&["daemon-reload"])?;
    println!("{}", "✓ Systemd reloaded".green());

    systemctl(&["enable", UNIT_NAME])?;
    println!("{}", "✓ Unit enabled".green());

    println!();
    println!("{}", "Service installed successfully!".bold().green());
    println!();
    println!("nodeboot will run once on every boot.");
    println!();
    println!("To check the last run:");
    println!("  sudo journalctl -u {}", UNIT_NAME);

    Ok(())
}

async fn uninstall() -> Result<()> {
    info!("Uninstalling systemd unit");

    // Best effort: the unit may never have been enabled
    let _ = systemctl(&["disable", UNIT_NAME]);

    if Path::new(SERVICE_PATH).exists() {
        std::fs::remove_file(SERVICE_PATH)
            .with_context(|| format!("Failed to remove service file: {}", SERVICE_PATH))?;
        println!(
            "{}",
            format!("✓ Service file removed: {}", SERVICE_PATH).green()
        );
    }

    let _ = systemctl(&["daemon-reload"]);

    println!("{}", "✓ Service uninstalled".green());

    Ok(())
}

fn systemctl(args: &[&str]) -> Result<()> {
    let output = std::process::Command::new("systemctl")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run systemctl {}", args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("systemctl {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(())
}
