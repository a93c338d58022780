//! Docval: rule-driven validation of customer onboarding documents.
//!
//! Documents (bank statements, payslips, residency permits, PPSN letters,
//! tax records) are checked against an ordered rule set for their type.
//! Every failing rule becomes a severity-tagged issue; a document is valid
//! when it has no issues.
//!
//! The library exposes the pieces used by the `docval` binary:
//! - [`document`]: the document model and JSON/YAML loading
//! - [`rules`]: the rule catalog, keyed by document type
//! - [`validate`]: the validation engine and batch validation
//! - [`session`]: the session store with file persistence and locking

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod logging;
pub mod rules;
pub mod session;
pub mod validate;

#[cfg(test)]
mod test_support;
