// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0
//! nodeboot CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Boot run entry point, logging setup and the supplementary
//!   `config`, `state` and `service` subcommands

pub mod boot;
pub mod commands;
pub mod logging;
