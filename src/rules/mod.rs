//! Validation rules.
//!
//! A `RuleCatalog` maps each document type to an ordered list of
//! `RuleDefinition`s. Each definition pairs issue metadata (id, category,
//! severity, description, recommendation) with a `Check`.

mod catalog;
mod check;
mod compile;
mod definition;
mod standard;


// Re-export public API
pub use catalog::RuleCatalog;
pub use check::{Check, CheckError, CheckFn, Comparison, Outcome};
pub use compile::compile_custom_rule;
pub use definition::{RuleDefinition, Severity};
pub use standard::{ppsn_check_character, standard_rules};
