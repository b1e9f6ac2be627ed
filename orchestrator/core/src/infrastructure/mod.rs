// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod command_runner;
pub mod configurator;
pub mod follow_on;
pub mod helper_tools;
pub mod host;
pub mod metadata;
pub mod ownership;
pub mod seed_probe;
pub mod state_store;

pub use host::host_collaborators;
