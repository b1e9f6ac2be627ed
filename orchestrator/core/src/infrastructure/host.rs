// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Wires the real host adapters for a bootstrap spec.

use crate::application::bootstrap::BootstrapCollaborators;
use crate::domain::command::CommandRunner;
use crate::domain::lifecycle::{FollowOnLauncher, HelperToolProvisioner, NodeConfigurator};
use crate::domain::node_config::BootstrapSpec;
use crate::infrastructure::command_runner::ShellCommandRunner;
use crate::infrastructure::configurator::CommandConfigurator;
use crate::infrastructure::follow_on::DetachedCommandLauncher;
use crate::infrastructure::helper_tools::StaticHelperTools;
use crate::infrastructure::metadata::HttpAddressLookup;
use crate::infrastructure::ownership::FsOwnershipInspector;
use crate::infrastructure::seed_probe::probe_from_config;
use crate::infrastructure::state_store::FileBootStateStore;
use anyhow::Context;
use std::sync::Arc;

pub fn host_collaborators(spec: &BootstrapSpec) -> anyhow::Result<BootstrapCollaborators> {
    let runner: Arc<dyn CommandRunner> = Arc::new(ShellCommandRunner::new());

    let address_lookup = HttpAddressLookup::new(spec.seed.metadata_endpoint.clone())
        .context("Failed to build metadata client")?;

    let configurator = spec.configure_command.as_ref().map(|command| {
        Arc::new(CommandConfigurator::new(runner.clone(), command.clone())) as Arc<dyn NodeConfigurator>
    });

    let helper_tools = spec.helper_tools.enabled.then(|| {
        Arc::new(StaticHelperTools::new(spec.helper_tools.directory.clone()))
            as Arc<dyn HelperToolProvisioner>
    });

    let follow_on = spec.follow_on_command.as_ref().map(|command| {
        Arc::new(DetachedCommandLauncher::new(command.clone())) as Arc<dyn FollowOnLauncher>
    });

    Ok(BootstrapCollaborators {
        state_store: Arc::new(FileBootStateStore::new(spec.state_file.clone())),
        runner,
        ownership: Arc::new(FsOwnershipInspector::new()),
        address_lookup: Arc::new(address_lookup),
        seed_probe: probe_from_config(&spec.seed.probe),
        configurator,
        helper_tools,
        follow_on,
    })
}
