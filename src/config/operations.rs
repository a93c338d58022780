//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{DocvalError, Result};
use crate::rules::RuleCatalog;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "docval.yaml";

/// Environment variable overriding `environment`.
pub const ENV_ENVIRONMENT: &str = "DOCVAL_ENV";

/// Environment variable overriding `debug`.
pub const ENV_DEBUG: &str = "DOCVAL_DEBUG";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(DocvalError::UserError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "loading config");
        Self::from_yaml(&content)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, `./docval.yaml` is used when
    /// present, otherwise defaults. Environment overrides are applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map of defaults.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                DocvalError::UserError(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply `DOCVAL_ENV` and `DOCVAL_DEBUG` overrides using `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup(ENV_ENVIRONMENT)
            && !env.trim().is_empty()
        {
            self.environment = env.trim().to_string();
        }

        if let Some(flag) = lookup(ENV_DEBUG) {
            self.debug = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_stale_minutes` must be positive
    /// - `session_dir` must be non-empty
    /// - `rules.max_deduction_ratio` must lie in `(0, 1]`
    /// - custom rule ids must be non-empty and unique
    /// - custom rules must compile and must not reuse a built-in rule id
    pub fn validate(&self) -> Result<()> {
        if self.lock_stale_minutes == 0 {
            return Err(DocvalError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.session_dir.trim().is_empty() {
            return Err(DocvalError::UserError(
                "config validation failed: session_dir must be non-empty".to_string(),
            ));
        }

        let ratio = self.rules.max_deduction_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(DocvalError::UserError(format!(
                "config validation failed: rules.max_deduction_ratio must be in (0, 1] (found {})",
                ratio
            )));
        }

        let mut seen = BTreeSet::new();
        for rule in &self.rules.custom {
            if rule.id.trim().is_empty() {
                return Err(DocvalError::UserError(
                    "config validation failed: custom rule ids must be non-empty".to_string(),
                ));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(DocvalError::UserError(format!(
                    "config validation failed: duplicate custom rule id '{}'",
                    rule.id
                )));
            }
        }

        // Custom rules must compile against the built-in catalog.
        RuleCatalog::from_config(&self.rules)?;

        Ok(())
    }

    /// Path of the session directory.
    pub fn session_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.session_dir)
    }

    /// Number of batch workers. `requested` overrides `batch_workers`, and
    /// `0` resolves to the available parallelism.
    pub fn workers(&self, requested: Option<usize>) -> usize {
        match requested.unwrap_or(self.batch_workers) {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}
