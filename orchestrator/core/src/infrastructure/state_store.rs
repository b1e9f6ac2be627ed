// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Boot State Store Implementations
//!
//! - **FileBootStateStore** - YAML document on local disk, replaced atomically
//! - **InMemoryBootStateStore** - for tests and dry runs

use crate::domain::boot_state::{BootState, BootStateStore, StateStoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

pub struct FileBootStateStore {
    path: PathBuf,
}

impl FileBootStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, source: std::io::Error) -> StateStoreError {
        StateStoreError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl BootStateStore for FileBootStateStore {
    async fn load(&self) -> Result<BootState, StateStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No boot state at {:?}, starting fresh", self.path);
                return Ok(BootState::default());
            }
            Err(source) => {
                return Err(StateStoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BootState::default());
        }

        Ok(serde_yaml::from_str(&content)?)
    }

    async fn save(&self, state: &BootState) -> Result<(), StateStoreError> {
        let yaml = serde_yaml::to_string(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.write_error(e))?;
            }
        }

        // Write beside the target and rename so a crash never leaves half a file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, yaml)
            .await
            .map_err(|e| self.write_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;

        debug!("Boot state written to {:?}", self.path);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBootStateStore {
    state: Arc<RwLock<BootState>>,
}

impl InMemoryBootStateStore {
    pub fn new(initial: BootState) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> BootState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the stored state directly, as an external configurator would
    pub fn replace(&self, state: BootState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

#[async_trait]
impl BootStateStore for InMemoryBootStateStore {
    async fn load(&self) -> Result<BootState, StateStoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &BootState) -> Result<(), StateStoreError> {
        self.replace(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::boot_state::DeploymentType;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBootStateStore::new(dir.path().join("state.yaml"));

        let state = store.load().await.unwrap();

        assert_eq!(state, BootState::default());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.yaml");
        let store = FileBootStateStore::new(&path);

        let state = BootState {
            has_run_before: true,
            deployment_type: DeploymentType::Enterprise,
            leading_seed: Some("10.1.2.3".parse().unwrap()),
            raid_readahead: Some(256),
            ..BootState::default()
        };
        store.save(&state).await.unwrap();

        // A fresh store sees what the previous invocation wrote
        let reopened = FileBootStateStore::new(&path);
        assert_eq!(reopened.load().await.unwrap(), state);
        assert!(!dir.path().join("nested").join("state.yaml.tmp").exists());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.yaml");
        std::fs::write(&path, "has_run_before: [not, a, bool]\n").unwrap();

        let result = FileBootStateStore::new(&path).load().await;

        assert!(matches!(result, Err(StateStoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trips() {
        let store = InMemoryBootStateStore::default();
        let mut state = store.load().await.unwrap();
        state.record_error("boom");
        store.save(&state).await.unwrap();

        assert_eq!(store.snapshot().last_error.as_deref(), Some("boom"));
    }
}
