//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for docval.
///
/// This struct represents the contents of `docval.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Application settings
    // =========================================================================
    /// Deployment environment name, reported by `docval health`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Enables debug-level logging when `RUST_LOG` is not set.
    #[serde(default)]
    pub debug: bool,

    // =========================================================================
    // Session settings
    // =========================================================================
    /// Directory holding the session file, lock, and event log.
    #[serde(default = "default_session_dir")]
    pub session_dir: String,

    /// Minutes after which a session lock is considered stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    // =========================================================================
    // Validation settings
    // =========================================================================
    /// Worker threads for batch validation (0 = available parallelism).
    #[serde(default = "default_batch_workers")]
    pub batch_workers: usize,

    /// Rule thresholds, disabled rules, and custom rules.
    #[serde(default)]
    pub rules: RulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            debug: false,
            session_dir: default_session_dir(),
            lock_stale_minutes: default_lock_stale_minutes(),
            batch_workers: default_batch_workers(),
            rules: RulesConfig::default(),
        }
    }
}
