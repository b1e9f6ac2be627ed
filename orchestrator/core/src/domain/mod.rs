// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain types and the seams to the host: boot state, configuration,
//! ownership expectations, command execution and seed discovery.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types and traits shared by the boot sequence

pub mod boot_state;
pub mod command;
pub mod lifecycle;
pub mod node_config;
pub mod ownership;
pub mod seed;
