// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Service Supervisor
//!
//! Starts the data-store service for the node's deployment variant and, on the
//! node's very first boot, watches it through a short stabilization window.
//!
//! Right after the RAID is assembled the data device is occasionally not yet
//! usable and the freshly started service dies. Within the window every failed
//! health probe triggers an immediate restart followed by a backoff.
//!
//! ## Window Loop
//! | Probe result | Action |
//! |--------------|--------|
//! | healthy | wait `poll_interval`, probe again |
//! | unhealthy | restart, wait `restart_backoff + poll_interval` |
//! | window elapsed | stop, whatever the last result was |
//!
//! The window is bounded by wall-clock time only. The number of restarts
//! follows from the timings; nothing caps it separately.

use crate::domain::boot_state::DeploymentType;
use crate::domain::command::CommandRunner;
use crate::domain::node_config::{ServiceCommands, SupervisionTiming};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionReport {
    /// Whether a start command exists for the deployment variant
    pub started: bool,
    /// `None` when the node already completed its first boot
    pub stabilization: Option<StabilizationReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StabilizationReport {
    pub probes: u32,
    pub restarts: u32,
    pub last_probe_healthy: bool,
}

pub struct ServiceSupervisor {
    runner: Arc<dyn CommandRunner>,
    commands: ServiceCommands,
    timing: SupervisionTiming,
}

impl ServiceSupervisor {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        commands: ServiceCommands,
        timing: SupervisionTiming,
    ) -> Self {
        Self {
            runner,
            commands,
            timing,
        }
    }

    pub async fn start_and_supervise(
        &self,
        deployment: DeploymentType,
        already_completed_first_boot: bool,
    ) -> SupervisionReport {
        // Wait for system setup changes to settle
        sleep(self.timing.settle_delay).await;

        let start_command = self.commands.start_command(deployment);
        match start_command {
            Some(command) => {
                info!("Starting {} data-store service...", deployment);
                self.runner.exe(command, false).await;
            }
            None => info!("Deployment type {} has no data-store service to start", deployment),
        }

        sleep(self.timing.post_start_delay).await;

        if already_completed_first_boot {
            return SupervisionReport {
                started: start_command.is_some(),
                stabilization: None,
            };
        }

        let stabilization = self.stabilize(deployment, start_command).await;

        SupervisionReport {
            started: start_command.is_some(),
            stabilization: Some(stabilization),
        }
    }

    async fn stabilize(
        &self,
        deployment: DeploymentType,
        start_command: Option<&str>,
    ) -> StabilizationReport {
        info!(
            "Checking for {:?} to ensure the data-store stays up...",
            self.timing.window
        );

        let mut report = StabilizationReport::default();
        let window_start = Instant::now();

        while window_start.elapsed() < self.timing.window {
            report.probes += 1;
            let healthy = !self
                .runner
                .exe(&self.commands.health_check, true)
                .await
                .is_error();
            report.last_probe_healthy = healthy;
            metrics::counter!(
                "nodeboot_health_probe_total",
                "result" => if healthy { "healthy" } else { "unhealthy" }
            )
            .increment(1);

            if !healthy {
                if let Some(command) = start_command {
                    warn!("Data-store is not running, restarting {} service...", deployment);
                    self.runner.exe(command, false).await;
                    report.restarts += 1;
                    metrics::counter!(
                        "nodeboot_service_restarts_total",
                        "deployment" => deployment.to_string()
                    )
                    .increment(1);
                }
                sleep(self.timing.restart_backoff).await;
            }

            sleep(self.timing.poll_interval).await;
        }

        if report.last_probe_healthy {
            info!(
                "Data-store stable after {} probe(s), {} restart(s)",
                report.probes, report.restarts
            );
        } else {
            warn!(
                "Data-store still unhealthy at the end of the stabilization window ({} restart(s))",
                report.restarts
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::CommandOutput;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    const HEALTH: &str = "nodetool info";

    /// Answers health probes from a script (last answer repeats) and records
    /// every command it sees.
    struct ScriptedRunner {
        health: Mutex<VecDeque<bool>>,
        fallback_healthy: bool,
        commands: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(health: Vec<bool>, fallback_healthy: bool) -> Self {
            Self {
                health: Mutex::new(health.into()),
                fallback_healthy,
                commands: Mutex::new(Vec::new()),
            }
        }

        fn count(&self, command: &str) -> usize {
            self.commands.lock().unwrap().iter().filter(|c| *c == command).count()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn exe(&self, command: &str, _expect_error: bool) -> CommandOutput {
            self.commands.lock().unwrap().push(command.to_string());
            if command == HEALTH {
                let healthy = self
                    .health
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or(self.fallback_healthy);
                return if healthy {
                    CommandOutput::success("Gossip active : true")
                } else {
                    CommandOutput::failure(1, "Failed to connect to '127.0.0.1:7199'")
                };
            }
            CommandOutput::success("")
        }
    }

    fn supervisor(runner: Arc<ScriptedRunner>) -> ServiceSupervisor {
        ServiceSupervisor::new(runner, ServiceCommands::default(), SupervisionTiming::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_first_boot_skips_health_probe() {
        let runner = Arc::new(ScriptedRunner::new(vec![], false));

        let report = supervisor(runner.clone())
            .start_and_supervise(DeploymentType::Enterprise, true)
            .await;

        assert!(report.started);
        assert!(report.stabilization.is_none());
        assert_eq!(runner.count(HEALTH), 0);
        assert_eq!(runner.count("sudo service dse restart"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_unhealthy_restarts_until_window_closes() {
        let runner = Arc::new(ScriptedRunner::new(vec![], false));

        let started = Instant::now();
        let report = supervisor(runner.clone())
            .start_and_supervise(DeploymentType::Community, false)
            .await;
        let elapsed = started.elapsed();

        let stabilization = report.stabilization.unwrap();
        assert!(stabilization.restarts >= 4, "restarts: {}", stabilization.restarts);
        assert!(!stabilization.last_probe_healthy);
        // One initial start plus one per failed probe
        assert_eq!(
            runner.count("sudo service cassandra restart"),
            1 + stabilization.restarts as usize
        );

        // settle (5s) + post-start (30s) + window (15s), overshooting by at
        // most one backoff-and-poll cycle
        let window_elapsed = elapsed - Duration::from_secs(35);
        assert!(window_elapsed >= Duration::from_secs(15));
        assert!(window_elapsed < Duration::from_secs(19));
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_service_is_polled_for_whole_window() {
        let runner = Arc::new(ScriptedRunner::new(vec![], true));

        let report = supervisor(runner.clone())
            .start_and_supervise(DeploymentType::Community, false)
            .await;

        let stabilization = report.stabilization.unwrap();
        assert_eq!(stabilization.restarts, 0);
        assert_eq!(stabilization.probes, 15);
        assert!(stabilization.last_probe_healthy);
        assert_eq!(runner.count("sudo service cassandra restart"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_one_restart() {
        let runner = Arc::new(ScriptedRunner::new(vec![false], true));

        let report = supervisor(runner.clone())
            .start_and_supervise(DeploymentType::Enterprise, false)
            .await;

        let stabilization = report.stabilization.unwrap();
        assert_eq!(stabilization.restarts, 1);
        assert!(stabilization.last_probe_healthy);
        assert_eq!(runner.count("sudo service dse restart"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_deployment_starts_nothing() {
        let runner = Arc::new(ScriptedRunner::new(vec![], false));

        let report = supervisor(runner.clone())
            .start_and_supervise(DeploymentType::None, false)
            .await;

        assert!(!report.started);
        assert_eq!(report.stabilization.unwrap().restarts, 0);
        assert_eq!(runner.count("sudo service cassandra restart"), 0);
        assert_eq!(runner.count("sudo service dse restart"), 0);
    }
}
