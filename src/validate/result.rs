//! Validation issues and per-document results.

use crate::document::DocumentType;
use crate::rules::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category used when a rule could not evaluate a document.
pub const DATA_INTEGRITY_CATEGORY: &str = "DataIntegrityError";

/// A single problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Id of the rule that produced the issue.
    pub rule_id: String,
    pub severity: Severity,
    pub category: String,
    pub description: String,
    pub recommendation: String,
}

impl ValidationIssue {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            category: category.into(),
            description: description.into(),
            recommendation: recommendation.into(),
        }
    }

    pub fn is_data_integrity(&self) -> bool {
        self.category == DATA_INTEGRITY_CATEGORY
    }
}

/// Outcome of validating one document.
///
/// `is_valid` is derived from the issues and recomputed whenever a result is
/// built, including when it is read back from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawValidationResult")]
pub struct ValidationResult {
    pub document_id: String,
    pub document_type: DocumentType,
    pub customer_name: String,
    pub validation_date: DateTime<Utc>,
    issues: Vec<ValidationIssue>,
    is_valid: bool,
}

/// Serialized shape of a result. Any stored `is_valid` is ignored.
#[derive(Deserialize)]
struct RawValidationResult {
    document_id: String,
    document_type: DocumentType,
    customer_name: String,
    validation_date: DateTime<Utc>,
    #[serde(default)]
    issues: Vec<ValidationIssue>,
}

impl From<RawValidationResult> for ValidationResult {
    fn from(raw: RawValidationResult) -> Self {
        ValidationResult::new(
            raw.document_id,
            raw.document_type,
            raw.customer_name,
            raw.validation_date,
            raw.issues,
        )
    }
}

impl ValidationResult {
    pub fn new(
        document_id: impl Into<String>,
        document_type: DocumentType,
        customer_name: impl Into<String>,
        validation_date: DateTime<Utc>,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        let is_valid = issues.is_empty();
        Self {
            document_id: document_id.into(),
            document_type,
            customer_name: customer_name.into(),
            validation_date,
            issues,
            is_valid,
        }
    }

    /// Issues in rule evaluation order.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Most severe issue level, if any.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|issue| issue.severity).min()
    }

    /// Issue counts per severity, most severe first.
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Format the result as a user-facing report.
    ///
    /// ```text
    /// DOC-001 (Bank Statement, Aoife Byrne): 1 issue
    ///   [HIGH] BS-005 BalanceCheck: Closing balance is negative: -50.00
    ///          -> Review the account for overdraft and request an explanation
    /// ```
    pub fn format_report(&self) -> String {
        let mut msg = format!(
            "{} ({}, {}): ",
            self.document_id, self.document_type, self.customer_name
        );

        if self.is_valid {
            msg.push_str("valid\n");
            return msg;
        }

        let count = self.issues.len();
        msg.push_str(&format!(
            "{} issue{}\n",
            count,
            if count == 1 { "" } else { "s" }
        ));

        for issue in &self.issues {
            msg.push_str(&format!(
                "  [{}] {} {}: {}\n",
                issue.severity, issue.rule_id, issue.category, issue.description
            ));
            if !issue.recommendation.is_empty() {
                msg.push_str(&format!("         -> {}\n", issue.recommendation));
            }
        }

        msg
    }
}
