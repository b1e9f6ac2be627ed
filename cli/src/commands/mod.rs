// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the nodeboot CLI

pub mod config;
pub mod service;
pub mod state;

pub use self::config::ConfigCommand;
pub use self::service::ServiceCommand;
pub use self::state::StateCommand;
