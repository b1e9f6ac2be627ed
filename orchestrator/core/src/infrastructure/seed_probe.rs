// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Seed readiness probes.
//!
//! - **TcpSeedProbe** - the seed is up once its client port accepts a connection
//! - **ScriptSeedProbe** - delegates to an operator-supplied wait script that
//!   reads the seed address from `HOST`

use crate::domain::node_config::SeedProbeConfig;
use crate::domain::seed::{ProbeError, SeedReadinessProbe};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

pub fn probe_from_config(config: &SeedProbeConfig) -> Arc<dyn SeedReadinessProbe> {
    match config {
        SeedProbeConfig::Tcp {
            port,
            connect_timeout,
        } => Arc::new(TcpSeedProbe::new(*port, *connect_timeout)),
        SeedProbeConfig::Script { command } => Arc::new(ScriptSeedProbe::new(command.clone())),
    }
}

pub struct TcpSeedProbe {
    port: u16,
    connect_timeout: Duration,
}

impl TcpSeedProbe {
    pub fn new(port: u16, connect_timeout: Duration) -> Self {
        Self {
            port,
            connect_timeout,
        }
    }
}

#[async_trait]
impl SeedReadinessProbe for TcpSeedProbe {
    async fn is_ready(&self, seed: IpAddr) -> Result<bool, ProbeError> {
        let addr = SocketAddr::new(seed, self.port);
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) => {
                debug!("Seed {} not accepting connections: {}", addr, e);
                Ok(false)
            }
            Err(_) => {
                debug!("Connecting to seed {} timed out", addr);
                Ok(false)
            }
        }
    }
}

pub struct ScriptSeedProbe {
    command: String,
}

impl ScriptSeedProbe {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl SeedReadinessProbe for ScriptSeedProbe {
    async fn is_ready(&self, seed: IpAddr) -> Result<bool, ProbeError> {
        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("HOST", seed.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| ProbeError::Unavailable(format!("{}: {}", self.command, e)))?;

        Ok(status.success())
    }
}
