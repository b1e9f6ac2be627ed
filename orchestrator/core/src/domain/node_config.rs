// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

// Bootstrap Configuration Types
//
// Defines the configuration schema for a data-store node's boot orchestrator:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Directory ownership expectations
// - Reconciliation, seed and stabilization timings
// - Service, tuning and helper commands

use crate::domain::boot_state::DeploymentType;
use crate::domain::ownership::{default_directories, DirectoryOwnershipSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_VERSION: &str = "nodeboot/v1";
pub const KIND: &str = "BootstrapConfig";

/// Top-level Kubernetes-style bootstrap configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfigManifest {
    /// API version (must be "nodeboot/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "BootstrapConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: BootstrapSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable node name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Bootstrap settings (content under spec:)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSpec {
    /// Where the boot state survives between invocations
    pub state_file: PathBuf,

    /// Directories whose ownership is reconciled on first boot
    pub directories: Vec<DirectoryOwnershipSpec>,

    pub reconcile: ReconcileTiming,
    pub supervision: SupervisionTiming,
    pub services: ServiceCommands,
    pub seed: SeedConfig,
    pub tuning: TuningConfig,
    pub helper_tools: HelperToolsConfig,

    /// Full first-boot configuration command. `null` disables the step.
    pub configure_command: Option<String>,

    /// Launched detached once the seed is reachable. `null` disables it.
    pub follow_on_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileTiming {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

/// Post-start supervision timings. The stabilization window only runs on the
/// node's first boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisionTiming {
    /// Lets mounts and tuning from earlier steps take effect
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    /// How long the service gets to come up (or crash) before anyone looks
    #[serde(with = "humantime_serde")]
    pub post_start_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub restart_backoff: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCommands {
    pub community: String,
    pub enterprise: String,
    pub opscenter: String,
    /// Exits zero only while the data-store is up
    pub health_check: String,
}

impl ServiceCommands {
    /// Start (restart) command for a cluster deployment variant. Variants that
    /// do not run the data-store locally have none.
    pub fn start_command(&self, deployment: DeploymentType) -> Option<&str> {
        match deployment {
            DeploymentType::Community => Some(&self.community),
            DeploymentType::Enterprise => Some(&self.enterprise),
            DeploymentType::OpsCenterOnly | DeploymentType::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Returns this host's private IPv4 address as plain text
    pub metadata_endpoint: String,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub probe: SeedProbeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SeedProbeConfig {
    /// Ready once the seed accepts TCP connections on `port`
    Tcp {
        #[serde(default = "default_seed_port")]
        port: u16,
        #[serde(default = "default_connect_timeout", with = "humantime_serde")]
        connect_timeout: Duration,
    },
    /// Ready once `command` exits zero; the seed address is passed in `HOST`
    Script { command: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Device whose read-ahead is re-applied on every boot
    pub raid_device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperToolsConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

// Default value functions
fn default_seed_port() -> u16 {
    9042
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(3)
}

impl Default for ReconcileTiming {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

impl Default for SupervisionTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(5),
            post_start_delay: Duration::from_secs(30),
            window: Duration::from_secs(15),
            poll_interval: Duration::from_secs(1),
            restart_backoff: Duration::from_secs(3),
        }
    }
}

impl Default for ServiceCommands {
    fn default() -> Self {
        Self {
            community: "sudo service cassandra restart".to_string(),
            enterprise: "sudo service dse restart".to_string(),
            opscenter: "sudo service opscenterd restart".to_string(),
            health_check: "nodetool info".to_string(),
        }
    }
}

impl Default for SeedProbeConfig {
    fn default() -> Self {
        Self::Tcp {
            port: default_seed_port(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            metadata_endpoint: "http://169.254.169.254/latest/meta-data/local-ipv4".to_string(),
            poll_interval: Duration::from_secs(5),
            probe: SeedProbeConfig::default(),
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            raid_device: "/dev/md0".to_string(),
        }
    }
}

impl Default for HelperToolsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("/usr/bin"),
        }
    }
}

impl Default for BootstrapSpec {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("/var/lib/nodeboot/state.yaml"),
            directories: default_directories(),
            reconcile: ReconcileTiming::default(),
            supervision: SupervisionTiming::default(),
            services: ServiceCommands::default(),
            seed: SeedConfig::default(),
            tuning: TuningConfig::default(),
            helper_tools: HelperToolsConfig::default(),
            configure_command: Some("python /home/ubuntu/datastax_ami/ds2_configure.py".to_string()),
            follow_on_command: Some(
                "sudo -u ubuntu python /home/ubuntu/datastax_ami/ds3_after_init.py".to_string(),
            ),
        }
    }
}

impl Default for BootstrapConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "nodeboot".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: None,
                labels: None,
            },
            spec: BootstrapSpec::default(),
        }
    }
}

impl BootstrapConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate locations, in precedence order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var("NODEBOOT_CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./nodeboot.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".nodeboot").join("config.yaml"));
        }
        paths.push(PathBuf::from("/etc/nodeboot/config.yaml"));
        paths
    }

    /// Discover configuration file using precedence order
    /// 1. NODEBOOT_CONFIG_PATH environment variable
    /// 2. ./nodeboot.yaml (working directory)
    /// 3. ~/.nodeboot/config.yaml (user home)
    /// 4. /etc/nodeboot/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::info!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NODEBOOT_STATE_FILE") {
            if !val.is_empty() {
                tracing::info!("Environment override: NODEBOOT_STATE_FILE={}", val);
                self.spec.state_file = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("NODEBOOT_SKIP_HELPER_TOOLS") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => {
                    tracing::info!("Environment override: NODEBOOT_SKIP_HELPER_TOOLS=true");
                    self.spec.helper_tools.enabled = false;
                }
                "false" | "0" | "no" | "off" => {
                    self.spec.helper_tools.enabled = true;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for NODEBOOT_SKIP_HELPER_TOOLS: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let spec = &self.spec;

        if spec.reconcile.max_attempts == 0 {
            anyhow::bail!("spec.reconcile.max_attempts must be at least 1");
        }

        if spec.supervision.window.is_zero() {
            anyhow::bail!("spec.supervision.window cannot be zero");
        }

        // A zero poll interval would spin the stabilization loop
        if spec.supervision.poll_interval.is_zero() {
            anyhow::bail!("spec.supervision.poll_interval cannot be zero");
        }

        if spec.seed.poll_interval.is_zero() {
            anyhow::bail!("spec.seed.poll_interval cannot be zero");
        }

        for (name, command) in [
            ("community", &spec.services.community),
            ("enterprise", &spec.services.enterprise),
            ("opscenter", &spec.services.opscenter),
            ("health_check", &spec.services.health_check),
        ] {
            if command.trim().is_empty() {
                anyhow::bail!("spec.services.{} cannot be empty", name);
            }
        }

        for dir in &spec.directories {
            if !dir.path.is_absolute() {
                anyhow::bail!("Directory path must be absolute: {:?}", dir.path);
            }
            if dir.user.is_empty() || dir.group.is_empty() {
                anyhow::bail!("Directory {:?} needs both a user and a group", dir.path);
            }
        }

        if let SeedProbeConfig::Script { command } = &spec.seed.probe {
            if command.trim().is_empty() {
                anyhow::bail!("spec.seed.probe.command cannot be empty");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = BootstrapConfigManifest::default();
        assert_eq!(manifest.api_version, "nodeboot/v1");
        assert_eq!(manifest.kind, "BootstrapConfig");
        assert!(!manifest.metadata.name.is_empty());
        assert_eq!(manifest.spec.directories.len(), 3);
        assert_eq!(manifest.spec.reconcile.max_attempts, 10);
        assert_eq!(manifest.spec.supervision.window, Duration::from_secs(15));
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
apiVersion: nodeboot/v1
kind: BootstrapConfig
metadata:
  name: cass-node-1
spec:
  state_file: /tmp/nodeboot-state.yaml
  supervision:
    window: 20s
    restart_backoff: 500ms
  seed:
    probe:
      type: script
      command: /opt/wait_for_seed.sh
"#;
        let manifest = BootstrapConfigManifest::from_yaml_str(yaml).unwrap();

        assert_eq!(manifest.metadata.name, "cass-node-1");
        assert_eq!(manifest.spec.state_file, PathBuf::from("/tmp/nodeboot-state.yaml"));
        assert_eq!(manifest.spec.supervision.window, Duration::from_secs(20));
        assert_eq!(manifest.spec.supervision.restart_backoff, Duration::from_millis(500));
        // Untouched fields keep their defaults
        assert_eq!(manifest.spec.supervision.poll_interval, Duration::from_secs(1));
        assert_eq!(manifest.spec.services.health_check, "nodetool info");
        assert_eq!(
            manifest.spec.seed.probe,
            SeedProbeConfig::Script { command: "/opt/wait_for_seed.sh".to_string() }
        );
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_tcp_probe_port_defaults() {
        let yaml = "apiVersion: nodeboot/v1\nkind: BootstrapConfig\nmetadata:\n  name: n\nspec:\n  seed:\n    probe:\n      type: tcp\n";
        let manifest = BootstrapConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.spec.seed.probe, SeedProbeConfig::default());
    }

    #[test]
    fn test_start_command_per_deployment() {
        let services = ServiceCommands::default();
        assert_eq!(
            services.start_command(DeploymentType::Community),
            Some("sudo service cassandra restart")
        );
        assert_eq!(
            services.start_command(DeploymentType::Enterprise),
            Some("sudo service dse restart")
        );
        assert_eq!(services.start_command(DeploymentType::OpsCenterOnly), None);
        assert_eq!(services.start_command(DeploymentType::None), None);
    }

    #[test]
    fn test_validation() {
        let mut manifest = BootstrapConfigManifest::default();
        assert!(manifest.validate().is_ok());

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.reconcile.max_attempts = 0;
        assert!(manifest.validate().is_err());
        manifest.spec.reconcile.max_attempts = 10;

        manifest.spec.supervision.poll_interval = Duration::ZERO;
        assert!(manifest.validate().is_err());
        manifest.spec.supervision.poll_interval = Duration::from_secs(1);

        manifest.spec.services.health_check = "  ".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.services.health_check = "nodetool info".to_string();

        manifest
            .spec
            .directories
            .push(DirectoryOwnershipSpec::new("relative/dir", "cassandra", "cassandra"));
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodeboot.yaml");

        let mut manifest = BootstrapConfigManifest::default();
        manifest.metadata.name = "seed-1".to_string();
        manifest.spec.follow_on_command = None;
        manifest.to_yaml_file(&path).unwrap();

        let loaded = BootstrapConfigManifest::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.metadata.name, "seed-1");
        assert!(loaded.spec.follow_on_command.is_none());
        assert_eq!(loaded.spec.supervision, SupervisionTiming::default());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let result = BootstrapConfigManifest::load_or_default(Some(PathBuf::from(
            "/nonexistent/nodeboot.yaml",
        )));
        assert!(result.is_err());
    }
}
