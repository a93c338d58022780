//! Configuration model for docval.
//!
//! This module defines the Config struct that represents `docval.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, environment overrides, and
//! validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::Config;
pub use operations::{DEFAULT_CONFIG_FILE, ENV_DEBUG, ENV_ENVIRONMENT};
pub use types::{CheckSpec, CustomRuleSpec, RulesConfig};
