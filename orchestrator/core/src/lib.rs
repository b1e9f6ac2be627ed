// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0
//! Boot orchestration for clustered data-store nodes.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain types, boot sequence services and host adapters

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
