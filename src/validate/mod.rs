//! Validation engine for docval.
//!
//! This module applies the rule catalog to documents:
//! - Single documents: ordered issues and a validity verdict
//! - Batches: one entry per input, in input order, optionally on worker threads
//! - Loaded files: load failures stay in place next to validated neighbours

mod batch;
mod engine;
mod result;

#[cfg(test)]
mod tests;

// Re-export public API
pub use batch::{BatchEntry, BatchSummary, validate_loaded};
pub use engine::ValidationEngine;
pub use result::{DATA_INTEGRITY_CATEGORY, ValidationIssue, ValidationResult};
