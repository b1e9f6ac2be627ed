// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! # nodeboot
//!
//! Boot-time orchestrator for clustered data-store nodes. Invoked once per
//! machine boot, normally from the `nodeboot.service` oneshot unit.
//!
//! ## Commands
//!
//! - `nodeboot` - run the bootstrap sequence
//! - `nodeboot config show|validate|generate` - Configuration management
//! - `nodeboot state show` - Print the persisted boot state
//! - `nodeboot service install|uninstall` - Register the boot-time unit

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nodeboot::commands::{self, ConfigCommand, ServiceCommand, StateCommand};
use nodeboot::logging::{init_logging, LogFormat};

/// nodeboot - bring a data-store node from power-on to a stable member
#[derive(Parser)]
#[command(name = "nodeboot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "NODEBOOT_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "NODEBOOT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Inspect the persisted boot state
    #[command(name = "state")]
    State {
        #[command(subcommand)]
        command: StateCommand,
    },

    /// Manage the boot-time systemd unit
    #[command(name = "service")]
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_format)?;

    match cli.command {
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::State { command }) => {
            commands::state::handle_command(command, cli.config).await
        }
        Some(Commands::Service { command }) => {
            commands::service::handle_command(command, cli.config).await
        }
        None => nodeboot::boot::run(cli.config).await,
    }
}
