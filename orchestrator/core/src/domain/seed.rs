// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Request(String),
    #[error("metadata endpoint returned HTTP {0}")]
    Status(u16),
    #[error("metadata endpoint returned an invalid address: {0:?}")]
    InvalidAddress(String),
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("seed probe could not run: {0}")]
    Unavailable(String),
}

/// Looks up this host's own private address (instance metadata service).
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn local_address(&self) -> Result<IpAddr, MetadataError>;
}

/// Answers "is the seed node up yet?".
///
/// `Ok(false)` and `Err(_)` are both "not yet" to the caller; the error only
/// changes what gets logged.
#[async_trait]
pub trait SeedReadinessProbe: Send + Sync {
    async fn is_ready(&self, seed: IpAddr) -> Result<bool, ProbeError>;
}
