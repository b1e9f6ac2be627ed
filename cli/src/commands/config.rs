// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use nodeboot_core::domain::node_config::{BootstrapConfigManifest, SeedProbeConfig};

const SAMPLE_CONFIG: &str = include_str!("../../templates/nodeboot.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./nodeboot.yaml)
        #[arg(short, long, default_value = "./nodeboot.yaml")]
        output: PathBuf,

        /// Write the built-in defaults instead of the commented sample
        #[arg(long)]
        defaults: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, defaults } => generate(&output, defaults).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = BootstrapConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  --config flag: {}", path.display()),
            None => println!("  --config flag: {}", "(not set)".dimmed()),
        }
        for (index, path) in BootstrapConfigManifest::search_paths().iter().enumerate() {
            let marker = if path.exists() {
                "found".green()
            } else {
                "missing".dimmed()
            };
            println!("  {}. {} ({})", index + 1, path.display(), marker);
        }
        println!();
    }

    let spec = &config.spec;

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!("  State file: {}", spec.state_file.display());
    println!();

    println!("{}", "Directories:".bold());
    for dir in &spec.directories {
        println!("  {} → {}:{}", dir.path.display(), dir.user, dir.group);
    }
    println!(
        "  Reconcile: {} attempts, {:?} apart",
        spec.reconcile.max_attempts, spec.reconcile.delay
    );
    println!();

    println!("{}", "Services:".bold());
    println!("  Community: {}", spec.services.community);
    println!("  Enterprise: {}", spec.services.enterprise);
    println!("  OpsCenter: {}", spec.services.opscenter);
    println!("  Health check: {}", spec.services.health_check);
    println!(
        "  Stabilization window: {:?} (poll {:?}, backoff {:?})",
        spec.supervision.window, spec.supervision.poll_interval, spec.supervision.restart_backoff
    );
    println!();

    println!("{}", "Seed:".bold());
    println!("  Metadata endpoint: {}", spec.seed.metadata_endpoint);
    match &spec.seed.probe {
        SeedProbeConfig::Tcp { port, .. } => println!("  Probe: tcp port {}", port),
        SeedProbeConfig::Script { command } => println!("  Probe: script `{}`", command),
    }
    println!();

    println!("{}", "First boot:".bold());
    println!(
        "  Configure command: {}",
        spec.configure_command.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Follow-on command: {}",
        spec.follow_on_command.as_deref().unwrap_or("(none)")
    );
    if spec.helper_tools.enabled {
        println!("  Helper tools: {}", spec.helper_tools.directory.display());
    } else {
        println!("  Helper tools: {}", "disabled".dimmed());
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = BootstrapConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: &Path, defaults: bool) -> Result<()> {
    if defaults {
        BootstrapConfigManifest::default()
            .to_yaml_file(output)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    } else {
        std::fs::write(output, SAMPLE_CONFIG)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    }

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
