// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Directory ownership expectations and the seam used to observe them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A directory that must settle to `user:group` after the first-boot chown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryOwnershipSpec {
    pub path: PathBuf,
    pub user: String,
    pub group: String,
}

impl DirectoryOwnershipSpec {
    pub fn new(path: impl Into<PathBuf>, user: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user: user.into(),
            group: group.into(),
        }
    }

    /// The command an operator should run when ownership never settles.
    pub fn chown_command(&self) -> String {
        format!("sudo chown -hR {}:{} {}", self.user, self.group, self.path.display())
    }

    pub fn is_satisfied_by(&self, owner: &Ownership) -> bool {
        owner.user == self.user && owner.group == self.group
    }
}

/// Home directory of the login user plus the two data directories a data-store
/// node may have, depending on whether its storage was striped into a RAID.
pub fn default_directories() -> Vec<DirectoryOwnershipSpec> {
    vec![
        DirectoryOwnershipSpec::new("/home/ubuntu", "ubuntu", "ubuntu"),
        DirectoryOwnershipSpec::new("/raid0/cassandra", "cassandra", "cassandra"),
        DirectoryOwnershipSpec::new("/mnt/cassandra", "cassandra", "cassandra"),
    ]
}

/// Resolved owner names of a filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    pub user: String,
    pub group: String,
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.group)
    }
}

pub trait OwnershipInspector: Send + Sync {
    fn is_dir(&self, path: &Path) -> bool;
    fn owner(&self, path: &Path) -> std::io::Result<Ownership>;
}
