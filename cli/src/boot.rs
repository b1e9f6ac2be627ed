// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! The default command: one pass of the bootstrap sequence.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use nodeboot_core::application::bootstrap::{BootOutcome, BootstrapOrchestrator};
use nodeboot_core::domain::node_config::BootstrapConfigManifest;
use nodeboot_core::infrastructure::host_collaborators;

/// Runs the sequence against the real host.
///
/// Configuration problems are the only errors surfaced to the caller; once
/// the orchestrator starts, every step is best effort and the run succeeds.
pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let manifest = BootstrapConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;
    manifest
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Starting nodeboot {} for {}",
        env!("CARGO_PKG_VERSION"),
        manifest.metadata.name
    );

    let collaborators = host_collaborators(&manifest.spec)?;
    let orchestrator = BootstrapOrchestrator::new(&manifest.spec, collaborators);

    let outcome = orchestrator.run().await;
    info!("{}", describe(&outcome));

    Ok(())
}

pub fn describe(outcome: &BootOutcome) -> String {
    match outcome {
        BootOutcome::OpsCenterOnly => "Boot finished: management console only".to_string(),
        BootOutcome::Standalone => "Boot finished: standalone node, no seed configured".to_string(),
        BootOutcome::StateUnreadable => {
            "Boot finished: boot state unreadable, data-store not started".to_string()
        }
        BootOutcome::ClusterMember { supervision, .. } => match &supervision.stabilization {
            Some(report) => format!(
                "Boot finished: cluster member, {} health probes, {} restarts",
                report.probes, report.restarts
            ),
            None => "Boot finished: cluster member, service restarted".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeboot_core::application::seed_gate::SeedWait;
    use nodeboot_core::application::service_supervisor::{
        StabilizationReport, SupervisionReport,
    };

    #[test]
    fn test_describe_cluster_member() {
        let outcome = BootOutcome::ClusterMember {
            seed: SeedWait::SelfIsSeed,
            supervision: SupervisionReport {
                started: true,
                stabilization: Some(StabilizationReport {
                    probes: 15,
                    restarts: 2,
                    last_probe_healthy: true,
                }),
            },
        };

        assert_eq!(
            describe(&outcome),
            "Boot finished: cluster member, 15 health probes, 2 restarts"
        );
    }

    #[test]
    fn test_describe_unreadable_state() {
        assert!(describe(&BootOutcome::StateUnreadable).contains("unreadable"));
    }

    #[test]
    fn test_describe_restart_boot() {
        let outcome = BootOutcome::ClusterMember {
            seed: SeedWait::SeedReady { probes: 1 },
            supervision: SupervisionReport {
                started: true,
                stabilization: None,
            },
        };

        assert!(describe(&outcome).contains("service restarted"));
    }
}
