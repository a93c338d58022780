//! On-disk layout of a session directory.

use std::path::PathBuf;

const SESSION_FILE: &str = "session.json";
const LOCK_FILE: &str = "session.lock";
const EVENTS_FILE: &str = "events.ndjson";

/// Paths of the files kept in a session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub dir: PathBuf,
}

impl SessionPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persisted documents and results.
    pub fn session_file(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Exclusive lock held while the session is mutated.
    pub fn lock_file(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    /// Append-only audit log.
    pub fn events_file(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }
}
