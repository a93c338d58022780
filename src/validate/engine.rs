//! The validation engine.

use super::result::{DATA_INTEGRITY_CATEGORY, ValidationIssue, ValidationResult};
use crate::document::Document;
use crate::error::Result;
use crate::rules::{Outcome, RuleCatalog, RuleDefinition, Severity};
use chrono::Utc;
use std::thread;
use tracing::{debug, info};

/// Applies a rule catalog to documents.
///
/// The engine only borrows the catalog and holds no other state, so one
/// engine can be shared freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'c> {
    catalog: &'c RuleCatalog,
}

impl<'c> ValidationEngine<'c> {
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c RuleCatalog {
        self.catalog
    }

    /// Validate one document.
    ///
    /// Rules are evaluated in catalog order and every failing rule yields one
    /// issue, in that order. A rule that cannot read the document (malformed
    /// amount or date, custom check failure) yields a HIGH
    /// `DataIntegrityError` issue and evaluation continues.
    ///
    /// # Returns
    ///
    /// * `Ok(ValidationResult)` - The verdict, valid iff no issues
    /// * `Err(DocvalError::InvalidDocumentType)` - The catalog has no rules for the type
    pub fn validate(&self, doc: &Document) -> Result<ValidationResult> {
        let rules = self.catalog.rules_for(doc.doc_type())?;

        let issues: Vec<ValidationIssue> = rules
            .iter()
            .filter_map(|rule| evaluate_rule(rule, doc))
            .collect();

        let result = ValidationResult::new(
            &doc.id,
            doc.doc_type(),
            &doc.customer_name,
            Utc::now(),
            issues,
        );

        info!(
            document = %doc.id,
            document_type = %doc.doc_type(),
            rules = rules.len(),
            issues = result.issues().len(),
            valid = result.is_valid(),
            "validated document"
        );

        Ok(result)
    }

    /// Validate documents one after another.
    ///
    /// Returns one entry per input in input order; a failing entry does not
    /// stop the batch.
    pub fn validate_all(&self, docs: &[Document]) -> Vec<Result<ValidationResult>> {
        docs.iter().map(|doc| self.validate(doc)).collect()
    }

    /// Validate documents on up to `workers` scoped threads.
    ///
    /// Produces the same entries in the same order as `validate_all`.
    pub fn validate_all_with_workers(
        &self,
        docs: &[Document],
        workers: usize,
    ) -> Vec<Result<ValidationResult>> {
        if workers <= 1 || docs.len() <= 1 {
            return self.validate_all(docs);
        }

        let chunk_size = docs.len().div_ceil(workers);
        debug!(
            documents = docs.len(),
            workers,
            chunk_size,
            "validating batch in parallel"
        );

        thread::scope(|s| {
            let handles: Vec<_> = docs
                .chunks(chunk_size)
                .map(|chunk| s.spawn(move || self.validate_all(chunk)))
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}

/// Turn one rule evaluation into an issue, if it failed.
fn evaluate_rule(rule: &RuleDefinition, doc: &Document) -> Option<ValidationIssue> {
    let description = match rule.evaluate(doc) {
        Ok(Outcome::Pass) => return None,
        Ok(Outcome::Fail { value }) => rule.render_description(doc, value.as_deref()),
        Ok(Outcome::FailWithDescription(description)) => description,
        Err(err) => {
            debug!(
                document = %doc.id,
                rule = %rule.id,
                error = %err,
                "rule could not be evaluated"
            );
            return Some(ValidationIssue::new(
                &rule.id,
                Severity::High,
                DATA_INTEGRITY_CATEGORY,
                format!("Rule {} could not be evaluated: {}", rule.id, err),
                "Correct the document data and validate again",
            ));
        }
    };

    debug!(document = %doc.id, rule = %rule.id, severity = %rule.severity, "rule failed");
    Some(ValidationIssue::new(
        &rule.id,
        rule.severity,
        &rule.category,
        description,
        &rule.recommendation,
    ))
}
