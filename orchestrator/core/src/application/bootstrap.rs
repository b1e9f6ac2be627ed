// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Bootstrap Orchestrator
//!
//! The one-shot sequence run on every boot. Steps run in a fixed order:
//!
//! 1. First boot only: full configuration, then ownership fix + reconcile
//! 2. Helper tool provisioning
//! 3. Host tuning (mount, swap-off, read-ahead)
//! 4. OpsCenter-only nodes restart the console and stop here
//! 5. Cluster members wait for the seed, hand off the follow-on initializer,
//!    then start and supervise the data-store
//!
//! Steps 4 and 5 are alternative modes, not consecutive stages.
//!
//! Nothing in the sequence aborts it. Failures are logged (and, for the
//! configuration step, recorded in the boot state) and the sequence carries on.
//!
//! A boot state that exists but cannot be read is never written over. The
//! node gets helper tools and baseline tuning, and everything that depends on
//! the persisted deployment details is left for an operator.

use crate::application::permission_reconciler::PermissionReconciler;
use crate::application::seed_gate::{SeedGate, SeedWait};
use crate::application::service_supervisor::{ServiceSupervisor, SupervisionReport};
use crate::application::system_tuning::SystemTuner;
use crate::domain::boot_state::{BootState, BootStateStore, DeploymentType};
use crate::domain::command::CommandRunner;
use crate::domain::lifecycle::{FollowOnLauncher, HelperToolProvisioner, NodeConfigurator};
use crate::domain::node_config::BootstrapSpec;
use crate::domain::ownership::{DirectoryOwnershipSpec, OwnershipInspector};
use crate::domain::seed::{AddressLookup, SeedReadinessProbe};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Host-facing adapters the sequence drives. `None` disables the matching
/// optional step.
pub struct BootstrapCollaborators {
    pub state_store: Arc<dyn BootStateStore>,
    pub runner: Arc<dyn CommandRunner>,
    pub ownership: Arc<dyn OwnershipInspector>,
    pub address_lookup: Arc<dyn AddressLookup>,
    pub seed_probe: Arc<dyn SeedReadinessProbe>,
    pub configurator: Option<Arc<dyn NodeConfigurator>>,
    pub helper_tools: Option<Arc<dyn HelperToolProvisioner>>,
    pub follow_on: Option<Arc<dyn FollowOnLauncher>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Management console restarted; the data-store is not run here
    OpsCenterOnly,
    /// No leading seed configured, so the node never joins a ring
    Standalone,
    /// Persisted state could not be read; it was left untouched and neither
    /// first-boot work nor the data-store ran
    StateUnreadable,
    ClusterMember {
        seed: SeedWait,
        supervision: SupervisionReport,
    },
}

pub struct BootstrapOrchestrator {
    state_store: Arc<dyn BootStateStore>,
    runner: Arc<dyn CommandRunner>,
    address_lookup: Arc<dyn AddressLookup>,
    configurator: Option<Arc<dyn NodeConfigurator>>,
    helper_tools: Option<Arc<dyn HelperToolProvisioner>>,
    follow_on: Option<Arc<dyn FollowOnLauncher>>,
    directories: Vec<DirectoryOwnershipSpec>,
    opscenter_command: String,
    reconciler: PermissionReconciler,
    tuner: SystemTuner,
    seed_gate: SeedGate,
    supervisor: ServiceSupervisor,
}

impl BootstrapOrchestrator {
    pub fn new(spec: &BootstrapSpec, collaborators: BootstrapCollaborators) -> Self {
        let runner = collaborators.runner;

        Self {
            reconciler: PermissionReconciler::new(
                runner.clone(),
                collaborators.ownership,
                spec.reconcile.clone(),
            ),
            tuner: SystemTuner::new(runner.clone(), spec.tuning.clone()),
            seed_gate: SeedGate::new(collaborators.seed_probe, spec.seed.poll_interval),
            supervisor: ServiceSupervisor::new(
                runner.clone(),
                spec.services.clone(),
                spec.supervision.clone(),
            ),
            state_store: collaborators.state_store,
            runner,
            address_lookup: collaborators.address_lookup,
            configurator: collaborators.configurator,
            helper_tools: collaborators.helper_tools,
            follow_on: collaborators.follow_on,
            directories: spec.directories.clone(),
            opscenter_command: spec.services.opscenter.clone(),
        }
    }

    pub async fn run(&self) -> BootOutcome {
        let mut state = match self.state_store.load().await {
            Ok(state) => state,
            Err(e) => {
                error!(
                    "Failed to load boot state, leaving it untouched and skipping state-dependent steps: {}",
                    e
                );
                return self.run_without_state().await;
            }
        };

        // Cleared when the store stops being readable mid-run
        let mut writable = true;

        if state.is_first_boot() {
            (state, writable) = self.initial_configuration(state).await;
        } else {
            info!("Skipping initial configurations.");
        }

        self.provision_helper_tools().await;

        self.tuner.apply(&state).await;

        if state.deployment_type == DeploymentType::OpsCenterOnly {
            info!("OpsCenter-only node, restarting the management console");
            self.runner.exe(&self.opscenter_command, false).await;
            return BootOutcome::OpsCenterOnly;
        }

        let Some(leading_seed) = state.leading_seed else {
            info!("No leading seed configured, not starting the data-store");
            return BootOutcome::Standalone;
        };

        let self_address = self.seed_gate.local_address(self.address_lookup.as_ref()).await;
        let seed = self.seed_gate.await_seed(self_address, leading_seed).await;

        if let Some(follow_on) = &self.follow_on {
            let launch = follow_on.launch();
            info!("Handed off follow-on initializer: {}", launch.description);
        }

        let supervision = self
            .supervisor
            .start_and_supervise(state.deployment_type, state.completed_first_boot)
            .await;

        if state.mark_first_boot_completed(Utc::now()) {
            info!("First boot completed");
            if writable {
                self.save_state(&state).await;
            } else {
                warn!("Boot state is unreadable, first-boot completion not recorded");
            }
        }

        BootOutcome::ClusterMember { seed, supervision }
    }

    async fn run_without_state(&self) -> BootOutcome {
        self.provision_helper_tools().await;
        self.tuner.apply(&BootState::default()).await;
        BootOutcome::StateUnreadable
    }

    async fn save_state(&self, state: &BootState) {
        if let Err(e) = self.state_store.save(state).await {
            error!("Failed to persist boot state: {}", e);
        }
    }

    /// Returns the configured state and whether the store may be written.
    async fn initial_configuration(&self, state: BootState) -> (BootState, bool) {
        let configured = match &self.configurator {
            Some(configurator) => configurator.configure(&state).await,
            None => Ok(()),
        };

        if let Err(e) = &configured {
            error!("Full configuration failed: {}", e);
        }

        // The configurator may have written deployment details to the store
        let (mut state, writable) = match self.state_store.load().await {
            Ok(reloaded) => (reloaded, true),
            Err(e) => {
                warn!(
                    "Could not reload boot state after configuration, not overwriting it: {}",
                    e
                );
                (state, false)
            }
        };

        if let Err(e) = configured {
            state.record_error(format!(
                "Exception seen during first-boot configuration: {}. Please check the nodeboot log for more info.",
                e
            ));
        }

        state.has_run_before = true;
        if writable {
            self.save_state(&state).await;
        }

        self.reconciler.issue_fix(&self.directories).await;
        let outcomes = self.reconciler.reconcile(&self.directories).await;
        let unsettled = outcomes.iter().filter(|o| o.is_unsettled()).count();
        if unsettled > 0 {
            warn!("{} director(ies) did not reach their expected owner", unsettled);
        }

        (state, writable)
    }

    async fn provision_helper_tools(&self) {
        if let Some(helper_tools) = &self.helper_tools {
            if let Err(e) = helper_tools.provision().await {
                error!("Failed to write helper tools: {}", e);
            }
        }
    }
}
