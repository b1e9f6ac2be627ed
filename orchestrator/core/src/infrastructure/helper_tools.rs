// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Static helper commands that print support links, demo pointers and the
//! installed tool list. Rewritten on every boot so image updates take effect.

use crate::domain::lifecycle::HelperToolProvisioner;
use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tracing::debug;

const HELPER_TOOLS: &[(&str, &str)] = &[
    ("datastax_support", include_str!("../../templates/datastax_support")),
    ("datastax_demos", include_str!("../../templates/datastax_demos")),
    ("datastax_tools", include_str!("../../templates/datastax_tools")),
];

pub struct StaticHelperTools {
    directory: PathBuf,
}

impl StaticHelperTools {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn tool_names() -> impl Iterator<Item = &'static str> {
        HELPER_TOOLS.iter().map(|(name, _)| *name)
    }
}

#[async_trait]
impl HelperToolProvisioner for StaticHelperTools {
    async fn provision(&self) -> std::io::Result<()> {
        for (name, body) in HELPER_TOOLS {
            let path = self.directory.join(name);
            tokio::fs::write(&path, body).await?;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;
            debug!("Wrote helper tool {:?}", path);
        }
        Ok(())
    }
}
