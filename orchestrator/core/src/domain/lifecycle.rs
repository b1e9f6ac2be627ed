// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Side-effecting boot steps the orchestrator triggers but does not reason
//! about: full first-boot configuration, helper tool files, and the follow-on
//! initializer.

use crate::domain::boot_state::BootState;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("configuration command `{command}` exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("configuration failed: {0}")]
    Other(String),
}

/// Full first-boot configuration of the data-store software. May write the
/// boot state store itself (deployment type, seed list, read-ahead).
#[async_trait]
pub trait NodeConfigurator: Send + Sync {
    async fn configure(&self, state: &BootState) -> Result<(), ConfigureError>;
}

#[async_trait]
pub trait HelperToolProvisioner: Send + Sync {
    /// Idempotent: overwrites whatever is already installed.
    async fn provision(&self) -> std::io::Result<()>;
}

/// Proof that a follow-on process was handed off.
///
/// Carries no exit status, join handle, or error channel: once launched, the
/// orchestrator cannot and does not observe the outcome. Cluster join must not
/// wait on the auxiliary component.
#[derive(Debug)]
#[must_use = "a detached launch should be logged or explicitly ignored"]
pub struct DetachedLaunch {
    pub description: String,
}

pub trait FollowOnLauncher: Send + Sync {
    fn launch(&self) -> DetachedLaunch;
}
