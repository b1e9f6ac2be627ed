// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod bootstrap;
pub mod permission_reconciler;
pub mod seed_gate;
pub mod service_supervisor;
pub mod system_tuning;

// Re-export the entry point for convenience
pub use bootstrap::{BootOutcome, BootstrapCollaborators, BootstrapOrchestrator};
