// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Seed Gate
//!
//! A cluster member that starts before its seed forms a ring of one, so
//! startup blocks here until the seed is reachable. There is deliberately no
//! timeout: only an operator can decide the seed is never coming back.

use crate::domain::seed::{AddressLookup, SeedReadinessProbe};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedWait {
    /// This node is the leading seed
    SelfIsSeed,
    /// The seed reported ready on the `probes`-th probe
    SeedReady { probes: u32 },
}

pub struct SeedGate {
    probe: Arc<dyn SeedReadinessProbe>,
    poll_interval: Duration,
}

impl SeedGate {
    pub fn new(probe: Arc<dyn SeedReadinessProbe>, poll_interval: Duration) -> Self {
        Self {
            probe,
            poll_interval,
        }
    }

    /// Resolves this host's own address, retrying until the metadata service
    /// answers.
    pub async fn local_address(&self, lookup: &dyn AddressLookup) -> IpAddr {
        loop {
            match lookup.local_address().await {
                Ok(address) => return address,
                Err(e) => {
                    warn!("Could not determine local address, retrying: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    pub async fn await_seed(&self, self_address: IpAddr, leading_seed: IpAddr) -> SeedWait {
        if self_address == leading_seed {
            info!("This node ({}) is the leading seed", self_address);
            return SeedWait::SelfIsSeed;
        }

        info!("Waiting for seed node {} to come online...", leading_seed);

        let mut probes = 0u32;
        loop {
            probes += 1;
            match self.probe.is_ready(leading_seed).await {
                Ok(true) => {
                    metrics::counter!("nodeboot_seed_probe_total", "result" => "ready").increment(1);
                    info!("Seed node {} is online after {} probe(s)", leading_seed, probes);
                    return SeedWait::SeedReady { probes };
                }
                Ok(false) => {
                    metrics::counter!("nodeboot_seed_probe_total", "result" => "not_ready")
                        .increment(1);
                    debug!("Seed node {} not ready (probe #{})", leading_seed, probes);
                }
                Err(e) => {
                    metrics::counter!("nodeboot_seed_probe_total", "result" => "error").increment(1);
                    warn!("Seed probe #{} against {} failed: {}", probes, leading_seed, e);
                }
            }
            sleep(self.poll_interval).await;
        }
    }
}
