// Copyright (c) 2026 nodeboot contributors
// SPDX-License-Identifier: AGPL-3.0

//! Reads directory ownership from the local filesystem and resolves ids to
//! names through the system user and group databases.

use crate::domain::ownership::{Ownership, OwnershipInspector};
use std::ffi::CStr;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

const MAX_BUFFER: usize = 1 << 20;

#[derive(Debug, Clone, Default)]
pub struct FsOwnershipInspector;

impl FsOwnershipInspector {
    pub fn new() -> Self {
        Self
    }
}

impl OwnershipInspector for FsOwnershipInspector {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn owner(&self, path: &Path) -> std::io::Result<Ownership> {
        let metadata = std::fs::metadata(path)?;
        Ok(Ownership {
            user: user_name(metadata.uid()),
            group: group_name(metadata.gid()),
        })
    }
}

/// Name for `uid`, or the numeric id when the account is unknown.
pub fn user_name(uid: u32) -> String {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: all out-pointers reference live locals and `buf` outlives
        // every read of `entry`.
        let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut entry, buf.as_mut_ptr(), buf.len(), &mut result)
        };

        if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return uid.to_string();
        }
        return unsafe { CStr::from_ptr(entry.pw_name) }
            .to_string_lossy()
            .into_owned();
    }
}

/// Name for `gid`, or the numeric id when the group is unknown.
pub fn group_name(gid: u32) -> String {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: as in `user_name`.
        let mut entry: libc::group = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::group = std::ptr::null_mut();
        let rc = unsafe {
            libc::getgrgid_r(gid, &mut entry, buf.as_mut_ptr(), buf.len(), &mut result)
        };

        if rc == libc::ERANGE && buf.len() < MAX_BUFFER {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return gid.to_string();
        }
        return unsafe { CStr::from_ptr(entry.gr_name) }
            .to_string_lossy()
            .into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_not_a_directory() {
        let inspector = FsOwnershipInspector::new();
        assert!(!inspector.is_dir(Path::new("/nonexistent/nodeboot/raid0")));
        assert!(inspector.owner(Path::new("/nonexistent/nodeboot/raid0")).is_err());
    }

    #[test]
    fn test_owner_of_fresh_directory_is_current_user() {
        let dir = tempfile::tempdir().unwrap();
        let inspector = FsOwnershipInspector::new();

        let owner = inspector.owner(dir.path()).unwrap();

        let uid = unsafe { libc::geteuid() };
        assert!(inspector.is_dir(dir.path()));
        assert_eq!(owner.user, user_name(uid));
        assert!(!owner.group.is_empty());
    }

    #[test]
    fn test_root_resolves_by_name() {
        assert_eq!(user_name(0), "root");
    }

    #[test]
    fn test_unknown_id_falls_back_to_number() {
        assert_eq!(user_name(3_999_999_999), "3999999999");
    }
}
