// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Boot State
//!
//! The only memory that survives between boot invocations. Read once at the
//! start of the sequence and written back at well-defined checkpoints
//! (configuration finished, first boot completed).
//!
//! The legacy launcher stored these values under string keys in an INI-like
//! store (`AMI.Type`, `AMI.LeadingSeed`, ...). Here they are explicit fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use thiserror::Error;

/// Product variant governing which service commands apply to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeploymentType {
    /// Open-source distribution. Older images wrote the literal `"False"` for
    /// this variant, so that spelling is accepted as well.
    #[serde(alias = "False", alias = "community")]
    Community,
    #[serde(alias = "enterprise")]
    Enterprise,
    /// Node runs only the management console, never joins the ring.
    #[serde(alias = "opscenter-only")]
    OpsCenterOnly,
    #[default]
    None,
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Community => "Community",
            Self::Enterprise => "Enterprise",
            Self::OpsCenterOnly => "OpsCenterOnly",
            Self::None => "None",
        };
        f.write_str(name)
    }
}

/// Persisted boot record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootState {
    /// Set once the first-boot configuration block has executed (successfully
    /// or not). Gates configuration and ownership reconciliation.
    pub has_run_before: bool,

    pub deployment_type: DeploymentType,

    /// Address of the seed every other member waits for. `None` means this
    /// node is not part of a cluster and the service is never started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading_seed: Option<IpAddr>,

    /// Flips false -> true exactly once, after the first post-start
    /// stabilization check returns.
    pub completed_first_boot: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_boot_completed_at: Option<DateTime<Utc>>,

    /// Block-device read-ahead (in 512-byte sectors) re-applied on every boot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raid_readahead: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl BootState {
    pub fn is_first_boot(&self) -> bool {
        !self.has_run_before
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Returns `true` if this call performed the transition.
    pub fn mark_first_boot_completed(&mut self, at: DateTime<Utc>) -> bool {
        if self.completed_first_boot {
            return false;
        }
        self.completed_first_boot = true;
        self.first_boot_completed_at = Some(at);
        true
    }
}

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("failed to read boot state from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write boot state to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("boot state is malformed: {0}")]
    Malformed(#[from] serde_yaml::Error),
}

/// Durable home of [`BootState`]. The orchestrator reads and writes it but
/// never owns it.
#[async_trait]
pub trait BootStateStore: Send + Sync {
    /// A store with nothing persisted yet returns `BootState::default()`.
    async fn load(&self) -> Result<BootState, StateStoreError>;
    async fn save(&self, state: &BootState) -> Result<(), StateStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_first_boot() {
        let state = BootState::default();
        assert!(state.is_first_boot());
        assert!(state.leading_seed.is_none());
        assert_eq!(state.deployment_type, DeploymentType::None);
    }

    #[test]
    fn test_legacy_false_type_means_community() {
        let state: BootState = serde_yaml::from_str("deployment_type: \"False\"\n").unwrap();
        assert_eq!(state.deployment_type, DeploymentType::Community);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let yaml = "has_run_before: true\nleading_seed: 10.0.0.5\nraid_readahead: 512\n";
        let state: BootState = serde_yaml::from_str(yaml).unwrap();

        assert!(state.has_run_before);
        assert_eq!(state.leading_seed, Some("10.0.0.5".parse().unwrap()));
        assert_eq!(state.raid_readahead, Some(512));
        assert!(!state.completed_first_boot);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_first_boot_completion_happens_once() {
        let mut state = BootState::default();
        let first = Utc::now();

        assert!(state.mark_first_boot_completed(first));
        assert!(!state.mark_first_boot_completed(Utc::now()));
        assert_eq!(state.first_boot_completed_at, Some(first));
    }
}
