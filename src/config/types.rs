//! Configuration types and defaults for docval.
//!
//! This module defines the rule settings, data-driven rule specs, and default
//! value functions used by the Config struct.

use crate::rules::{Comparison, Severity};
use serde::{Deserialize, Serialize};

/// Rule thresholds and catalog adjustments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Maximum age of a bank statement at upload, in days.
    pub statement_max_age_days: u32,

    /// Maximum age of a payslip at upload, in days.
    pub payslip_max_age_days: u32,

    /// Flag residency permits expiring within this many days of upload.
    pub irp_expiry_warning_days: u32,

    /// Flag payslips whose deductions exceed this share of gross pay.
    pub max_deduction_ratio: f64,

    /// Rule ids removed from the catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,

    /// Data-driven rules appended after the built-in rules of their type.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomRuleSpec>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            statement_max_age_days: default_statement_max_age_days(),
            payslip_max_age_days: default_payslip_max_age_days(),
            irp_expiry_warning_days: default_irp_expiry_warning_days(),
            max_deduction_ratio: default_max_deduction_ratio(),
            disabled: Vec::new(),
            custom: Vec::new(),
        }
    }
}

/// A rule declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRuleSpec {
    pub id: String,

    /// Document type name (any spelling accepted by `DocumentType::from_str`).
    pub document_type: String,

    pub category: String,

    pub severity: Severity,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub recommendation: String,

    pub check: CheckSpec,
}

/// Serializable form of the data-driven check shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckSpec {
    Required {
        field: String,
    },
    Pattern {
        field: String,
        pattern: String,
    },
    Range {
        field: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Compare {
        left: String,
        op: Comparison,
        right: String,
    },
    DateOrder {
        earlier: String,
        later: String,
        #[serde(default)]
        strict: bool,
    },
    DateWithin {
        field: String,
        anchor: String,
        max_days: i64,
    },
}

impl CheckSpec {
    /// Field names the check reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            CheckSpec::Required { field }
            | CheckSpec::Pattern { field, .. }
            | CheckSpec::Range { field, .. } => vec![field.as_str()],
            CheckSpec::Compare { left, right, .. } => vec![left.as_str(), right.as_str()],
            CheckSpec::DateOrder { earlier, later, .. } => vec![earlier.as_str(), later.as_str()],
            CheckSpec::DateWithin { field, anchor, .. } => vec![field.as_str(), anchor.as_str()],
        }
    }
}

// Default value functions for serde
pub(crate) fn default_environment() -> String {
    "development".to_string()
}
pub(crate) fn default_session_dir() -> String {
    ".docval".to_string()
}
pub(crate) fn default_batch_workers() -> usize {
    1
}
pub(crate) fn default_lock_stale_minutes() -> u32 {
    30
}
pub(crate) fn default_statement_max_age_days() -> u32 {
    90
}
pub(crate) fn default_payslip_max_age_days() -> u32 {
    60
}
pub(crate) fn default_irp_expiry_warning_days() -> u32 {
    30
}
pub(crate) fn default_max_deduction_ratio() -> f64 {
    0.6
}
