//! Compilation of rules declared in configuration.

use super::check::Check;
use super::definition::RuleDefinition;
use crate::config::{CheckSpec, CustomRuleSpec};
use crate::document::DocumentType;
use crate::error::{DocvalError, Result};
use regex::Regex;

/// Compile a configured rule into a catalog entry for its document type.
///
/// # Returns
///
/// * `Ok((DocumentType, RuleDefinition))` - The rule and the type it applies to
/// * `Err(DocvalError::UserError)` - Unknown document type, a field the type
///   does not define, or a pattern that fails to compile (config error, exit 1)
pub fn compile_custom_rule(spec: &CustomRuleSpec) -> Result<(DocumentType, RuleDefinition)> {
    let doc_type: DocumentType = spec.document_type.parse().map_err(|_| {
        DocvalError::UserError(format!(
            "custom rule '{}' has unknown document_type '{}'\n\
             Fix: use one of BankStatement, Payslip, IRP, PPSN, TaxRecord.",
            spec.id, spec.document_type
        ))
    })?;

    for field in spec.check.fields() {
        if !doc_type.has_field(field) {
            return Err(DocvalError::UserError(format!(
                "custom rule '{}' reads field '{}', which {} documents do not have",
                spec.id,
                field,
                doc_type.display_name()
            )));
        }
    }

    let check = match &spec.check {
        CheckSpec::Required { field } => Check::required(field),
        CheckSpec::Pattern { field, pattern } => {
            let regex = Regex::new(pattern).map_err(|e| {
                DocvalError::UserError(format!(
                    "invalid regex pattern in custom rule '{}': '{}' - {}\n\
                     Fix: edit docval.yaml and correct the pattern.",
                    spec.id, pattern, e
                ))
            })?;
            Check::Pattern {
                field: field.clone(),
                regex,
            }
        }
        CheckSpec::Range { field, min, max } => Check::Range {
            field: field.clone(),
            min: *min,
            max: *max,
        },
        CheckSpec::Compare { left, op, right } => Check::compare(left, *op, right),
        CheckSpec::DateOrder {
            earlier,
            later,
            strict,
        } => Check::DateOrder {
            earlier: earlier.clone(),
            later: later.clone(),
            strict: *strict,
        },
        CheckSpec::DateWithin {
            field,
            anchor,
            max_days,
        } => Check::within_days(field, anchor, *max_days),
    };

    let rule = RuleDefinition::new(&spec.id, &spec.category, spec.severity, check)
        .describe(&spec.description)
        .recommend(&spec.recommendation);

    Ok((doc_type, rule))
}
