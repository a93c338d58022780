//! Cross-process session lock.
//!
//! The lock is a file created with `create_new` semantics, so only one
//! process can hold it. It contains JSON metadata (`owner`, `pid`,
//! `created_at`, `action`) used in error messages and by `session unlock`.

use crate::error::{DocvalError, Result};
use crate::events::actor_string;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Metadata stored in the lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g. `user@HOST`).
    pub owner: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    pub created_at: DateTime<Utc>,

    /// The session command holding the lock.
    pub action: String,
}

impl LockMetadata {
    pub fn new(action: &str) -> Self {
        Self {
            owner: actor_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
            action: action.to_string(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to read lock file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to parse lock file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Age as `2d 3h`, `4h 10m` or `7m`.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let (days, hours, minutes) = (age.num_days(), age.num_hours(), age.num_minutes());

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > i64::from(stale_minutes)
    }
}

/// RAII guard for the session lock. The lock file is removed on drop.
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
    released: bool,
}

impl SessionLock {
    /// Acquire the lock at `path` for `action`.
    ///
    /// # Returns
    ///
    /// * `Ok(SessionLock)` - The lock is held until the guard is dropped
    /// * `Err(DocvalError::LockError)` - Another process holds the lock (exit code 4)
    pub fn acquire(path: &Path, action: &str) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                DocvalError::UserError(format!(
                    "failed to create session directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    let holder = match LockMetadata::from_file(path) {
                        Ok(meta) => format!(
                            "\nLock: {} (created {} ago by {})\nAction: {}",
                            path.display(),
                            meta.age_string(),
                            meta.owner,
                            meta.action
                        ),
                        Err(_) => format!("\nLock: {}", path.display()),
                    };
                    DocvalError::LockError(format!(
                        "session is locked by another process{}\n\
                         Fix: wait for it to finish, or run `docval session unlock --force` \
                         if it is stale.",
                        holder
                    ))
                } else {
                    DocvalError::LockError(format!(
                        "failed to acquire lock '{}': {}",
                        path.display(),
                        e
                    ))
                }
            })?;

        let metadata = LockMetadata::new(action);
        let written = serde_json::to_string_pretty(&metadata)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                file.write_all(json.as_bytes())
                    .and_then(|_| file.sync_all())
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = written {
            let _ = fs::remove_file(path);
            return Err(DocvalError::LockError(format!(
                "failed to write lock metadata: {}",
                e
            )));
        }

        debug!(path = %path.display(), action, "acquired session lock");
        Ok(Self {
            path: path.to_path_buf(),
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock now, reporting failures.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
        {
            warn!(path = %self.path.display(), error = %e, "failed to release session lock");
        }
    }
}

/// A lock found on disk.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub path: PathBuf,
    pub metadata: LockMetadata,
    pub is_stale: bool,
}

impl fmt::Display for LockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (owner: {}, age: {}, action: {}{})",
            self.path.display(),
            self.metadata.owner,
            self.metadata.age_string(),
            self.metadata.action,
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

/// Inspect the lock at `path` without touching it.
pub fn read_lock(path: &Path, stale_minutes: u32) -> Result<Option<LockInfo>> {
    if !path.exists() {
        return Ok(None);
    }
    let metadata = LockMetadata::from_file(path)?;
    let is_stale = metadata.is_stale(stale_minutes);
    Ok(Some(LockInfo {
        path: path.to_path_buf(),
        metadata,
        is_stale,
    }))
}

/// Remove the lock at `path`.
///
/// The caller decides whether clearing is appropriate (`--force`).
///
/// # Returns
///
/// * `Ok(LockInfo)` - The lock that was removed
/// * `Err(DocvalError::UserError)` - No lock exists or it could not be removed
pub fn clear_lock(path: &Path, stale_minutes: u32) -> Result<LockInfo> {
    let info = read_lock(path, stale_minutes)?.ok_or_else(|| {
        DocvalError::UserError(format!("no session lock at: {}", path.display()))
    })?;

    fs::remove_file(path).map_err(|e| {
        DocvalError::UserError(format!(
            "failed to clear lock '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(info)
}
