//! Batch validation over loaded input files.

use super::engine::ValidationEngine;
use super::result::ValidationResult;
use crate::document::{Document, LoadedDocument};
use crate::error::{DocvalError, Result};
use crate::exit_codes;
use serde_json::{Value, json};

/// One position in a batch: where the entry came from and what happened.
#[derive(Debug)]
pub struct BatchEntry {
    pub source: String,
    pub outcome: Result<ValidationResult>,
}

impl BatchEntry {
    pub fn to_json(&self) -> Value {
        match &self.outcome {
            Ok(result) => json!({
                "source": self.source,
                "result": result,
            }),
            Err(err) => json!({
                "source": self.source,
                "error": err.to_string(),
                "exit_code": err.exit_code(),
            }),
        }
    }
}

/// Validate loaded entries, keeping load failures in their input position.
///
/// Entries that loaded are validated as one batch on `workers` threads.
pub fn validate_loaded(
    engine: &ValidationEngine<'_>,
    loaded: Vec<LoadedDocument>,
    workers: usize,
) -> Vec<BatchEntry> {
    let mut slots: Vec<(String, Option<DocvalError>)> = Vec::with_capacity(loaded.len());
    let mut documents: Vec<Document> = Vec::new();

    for entry in loaded {
        match entry.document {
            Ok(doc) => {
                documents.push(doc);
                slots.push((entry.source, None));
            }
            Err(err) => slots.push((entry.source, Some(err))),
        }
    }

    let mut results = engine
        .validate_all_with_workers(&documents, workers)
        .into_iter();

    slots
        .into_iter()
        .map(|(source, load_error)| {
            let outcome = match load_error {
                Some(err) => Err(err),
                None => results.next().unwrap_or_else(|| {
                    Err(DocvalError::UserError(
                        "batch produced fewer results than documents".to_string(),
                    ))
                }),
            };
            BatchEntry { source, outcome }
        })
        .collect()
}

/// Counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub invalid_type: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut summary = BatchSummary {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match &entry.outcome {
                Ok(result) if result.is_valid() => summary.valid += 1,
                Ok(_) => summary.invalid += 1,
                Err(DocvalError::InvalidDocumentType(_)) => summary.invalid_type += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Process exit code for the batch.
    ///
    /// Invalid documents win over unsupported types, which win over other
    /// load failures.
    pub fn exit_code(&self) -> i32 {
        if self.invalid > 0 {
            exit_codes::VALIDATION_FAILURE
        } else if self.invalid_type > 0 {
            exit_codes::INVALID_DOCUMENT_TYPE
        } else if self.failed > 0 {
            exit_codes::USER_ERROR
        } else {
            exit_codes::SUCCESS
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "total": self.total,
            "valid": self.valid,
            "invalid": self.invalid,
            "invalid_type": self.invalid_type,
            "failed": self.failed,
        })
    }
}
