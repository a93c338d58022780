//! Session store for docval.
//!
//! A session holds the documents submitted so far and the results of every
//! validation run over them. The engine never sees the session; commands
//! read documents out of it and record results back.
//!
//! # Session Directory
//!
//! The CLI persists sessions under `session_dir` (default `.docval/`):
//! - `session.json`: documents and results, replaced atomically on save
//! - `session.lock`: held while a command mutates the session
//! - `events.ndjson`: append-only audit log of mutations

mod lock;
mod paths;
mod report;
mod store;

#[cfg(test)]
mod tests;

// Re-export public API
pub use lock::{LockInfo, LockMetadata, SessionLock, clear_lock, read_lock};
pub use paths::SessionPaths;
pub use report::SessionReport;
pub use store::{SessionState, SessionStore};
