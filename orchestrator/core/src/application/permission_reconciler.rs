// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Permission Reconciler Application Service
//!
//! First-boot only. Image baking leaves the home and data directories owned by
//! whoever built the image, so the sequence issues a recursive chown for each
//! expected owner and then waits for the change to become visible. The chown
//! is the only mutation; reconciliation itself just observes.

use crate::domain::command::CommandRunner;
use crate::domain::node_config::ReconcileTiming;
use crate::domain::ownership::{DirectoryOwnershipSpec, Ownership, OwnershipInspector};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Result of reconciling a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Directory does not exist on this node type
    Skipped { path: PathBuf },
    Settled { path: PathBuf, attempts: u32 },
    /// `fix_command` is what an operator should run by hand
    Unsettled {
        path: PathBuf,
        attempts: u32,
        last_seen: Option<Ownership>,
        fix_command: String,
    },
}

impl ReconcileOutcome {
    pub fn is_unsettled(&self) -> bool {
        matches!(self, Self::Unsettled { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Skipped { .. } => "skipped",
            Self::Settled { .. } => "settled",
            Self::Unsettled { .. } => "unsettled",
        }
    }
}

pub struct PermissionReconciler {
    runner: Arc<dyn CommandRunner>,
    inspector: Arc<dyn OwnershipInspector>,
    timing: ReconcileTiming,
}

impl PermissionReconciler {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        inspector: Arc<dyn OwnershipInspector>,
        timing: ReconcileTiming,
    ) -> Self {
        Self {
            runner,
            inspector,
            timing,
        }
    }

    /// Best-effort recursive chown for every directory, issued once and
    /// unconditionally. Missing directories just make the command fail.
    pub async fn issue_fix(&self, specs: &[DirectoryOwnershipSpec]) {
        for spec in specs {
            self.runner.exe(&spec.chown_command(), false).await;
        }
    }

    /// Waits for each existing directory to report its expected owner.
    ///
    /// Never fails the boot: exhaustion is reported as a warning that names the
    /// exact command an operator should run.
    pub async fn reconcile(&self, specs: &[DirectoryOwnershipSpec]) -> Vec<ReconcileOutcome> {
        let mut outcomes = Vec::with_capacity(specs.len());
        for spec in specs {
            let outcome = self.reconcile_one(spec).await;
            metrics::counter!("nodeboot_permission_reconcile_total", "outcome" => outcome.label())
                .increment(1);
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn reconcile_one(&self, spec: &DirectoryOwnershipSpec) -> ReconcileOutcome {
        if !self.inspector.is_dir(&spec.path) {
            debug!("Skipping ownership check for absent directory {:?}", spec.path);
            return ReconcileOutcome::Skipped { path: spec.path.clone() };
        }

        info!("Checking permissions for: {}", spec.path.display());

        let max_attempts = self.timing.max_attempts.max(1);
        let mut last_seen = None;

        for attempt in 1..=max_attempts {
            debug!("Ownership attempt #{} for {:?}", attempt, spec.path);

            match self.inspector.owner(&spec.path) {
                Ok(owner) if spec.is_satisfied_by(&owner) => {
                    info!("Permissions set for {} as {}", spec.path.display(), owner);
                    return ReconcileOutcome::Settled {
                        path: spec.path.clone(),
                        attempts: attempt,
                    };
                }
                Ok(owner) => last_seen = Some(owner),
                Err(e) => debug!("Could not read owner of {:?}: {}", spec.path, e),
            }

            if attempt < max_attempts {
                sleep(self.timing.delay).await;
            }
        }

        warn!(
            "Permissions not set correctly for {} (observed {}). Please run manually:",
            spec.path.display(),
            last_seen
                .as_ref()
                .map(|o| o.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        let fix_command = spec.chown_command();
        warn!("{}", fix_command);
        warn!("sudo service dse restart");

        ReconcileOutcome::Unsettled {
            path: spec.path.clone(),
            attempts: max_attempts,
            last_seen,
            fix_command,
        }
    }
}
