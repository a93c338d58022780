//! Rule checks: the predicates a rule applies to a document.
//!
//! Most rules are one of a handful of data-driven shapes (required field,
//! pattern, range, cross-field comparison, date ordering, date window).
//! `Check::Custom` covers everything else.
//!
//! Value checks treat an absent field as not applicable. Absence is reported
//! by `Required` rules, so one missing field yields one issue.

use crate::document::{Document, FieldError, FieldValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Signature of a custom check.
pub type CheckFn = dyn Fn(&Document) -> Result<Outcome, CheckError> + Send + Sync;

/// Result of evaluating a check that could read its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// The check failed. `value` fills the `{value}` placeholder of the
    /// rule description.
    Fail { value: Option<String> },
    /// The check failed and computed its own description.
    FailWithDescription(String),
}

impl Outcome {
    pub fn fail() -> Self {
        Outcome::Fail { value: None }
    }

    pub fn fail_with_value(value: impl ToString) -> Self {
        Outcome::Fail {
            value: Some(value.to_string()),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// A check could not evaluate the document.
///
/// The engine records these as `DataIntegrityError` issues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{0}")]
    Custom(String),
}

/// Numeric comparison between two amount fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    /// Amounts closer than this are considered equal.
    const EPSILON: f64 = 1e-9;

    pub fn holds(&self, left: f64, right: f64) -> bool {
        let equal = (left - right).abs() < Self::EPSILON;
        match self {
            Comparison::Lt => left < right && !equal,
            Comparison::Le => left < right || equal,
            Comparison::Gt => left > right && !equal,
            Comparison::Ge => left > right || equal,
            Comparison::Eq => equal,
            Comparison::Ne => !equal,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }
}

/// The predicate of a rule.
#[derive(Clone)]
pub enum Check {
    /// Field must be present and not blank.
    Required { field: String },

    /// Present text field must match the pattern.
    Pattern { field: String, regex: Regex },

    /// Present amount must lie within `[min, max]`.
    Range {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// `left op right` must hold when both amounts are present.
    Compare {
        left: String,
        op: Comparison,
        right: String,
    },

    /// `earlier` must not be after `later` (strictly before when `strict`).
    DateOrder {
        earlier: String,
        later: String,
        strict: bool,
    },

    /// `anchor - field` must not exceed `max_days`.
    DateWithin {
        field: String,
        anchor: String,
        max_days: i64,
    },

    Custom(Arc<CheckFn>),
}

impl Check {
    pub fn required(field: &str) -> Self {
        Check::Required {
            field: field.to_string(),
        }
    }

    /// Compile a pattern check.
    pub fn pattern(field: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Check::Pattern {
            field: field.to_string(),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn at_least(field: &str, min: f64) -> Self {
        Check::Range {
            field: field.to_string(),
            min: Some(min),
            max: None,
        }
    }

    pub fn compare(left: &str, op: Comparison, right: &str) -> Self {
        Check::Compare {
            left: left.to_string(),
            op,
            right: right.to_string(),
        }
    }

    pub fn not_after(earlier: &str, later: &str) -> Self {
        Check::DateOrder {
            earlier: earlier.to_string(),
            later: later.to_string(),
            strict: false,
        }
    }

    pub fn before(earlier: &str, later: &str) -> Self {
        Check::DateOrder {
            earlier: earlier.to_string(),
            later: later.to_string(),
            strict: true,
        }
    }

    pub fn within_days(field: &str, anchor: &str, max_days: i64) -> Self {
        Check::DateWithin {
            field: field.to_string(),
            anchor: anchor.to_string(),
            max_days,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Result<Outcome, CheckError> + Send + Sync + 'static,
    {
        Check::Custom(Arc::new(f))
    }

    /// Evaluate the check against a document.
    pub fn evaluate(&self, doc: &Document) -> Result<Outcome, CheckError> {
        match self {
            Check::Required { field } => match doc.field(field)? {
                Some(value) if !value.is_blank() => Ok(Outcome::Pass),
                _ => Ok(Outcome::fail()),
            },

            Check::Pattern { field, regex } => {
                let Some(value) = present(doc, field)? else {
                    return Ok(Outcome::Pass);
                };
                let text = value.as_text(field)?.trim();
                if regex.is_match(text) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(Outcome::fail_with_value(text))
                }
            }

            Check::Range { field, min, max } => {
                let Some(value) = present(doc, field)? else {
                    return Ok(Outcome::Pass);
                };
                let amount = value.to_amount(field)?;
                let below = min.is_some_and(|min| amount < min);
                let above = max.is_some_and(|max| amount > max);
                if below || above {
                    Ok(Outcome::fail_with_value(format!("{:.2}", amount)))
                } else {
                    Ok(Outcome::Pass)
                }
            }

            Check::Compare { left, op, right } => {
                let (Some(l), Some(r)) = (present(doc, left)?, present(doc, right)?) else {
                    return Ok(Outcome::Pass);
                };
                let l = l.to_amount(left)?;
                let r = r.to_amount(right)?;
                if op.holds(l, r) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(Outcome::fail_with_value(format!("{:.2}", l)))
                }
            }

            Check::DateOrder {
                earlier,
                later,
                strict,
            } => {
                let (Some(e), Some(l)) = (present(doc, earlier)?, present(doc, later)?) else {
                    return Ok(Outcome::Pass);
                };
                let e = e.to_date(earlier)?;
                let l = l.to_date(later)?;
                let ordered = if *strict { e < l } else { e <= l };
                if ordered {
                    Ok(Outcome::Pass)
                } else {
                    Ok(Outcome::fail_with_value(e))
                }
            }

            Check::DateWithin {
                field,
                anchor,
                max_days,
            } => {
                let (Some(f), Some(a)) = (present(doc, field)?, present(doc, anchor)?) else {
                    return Ok(Outcome::Pass);
                };
                let days = (a.to_date(anchor)? - f.to_date(field)?).num_days();
                if days > *max_days {
                    Ok(Outcome::fail_with_value(days))
                } else {
                    Ok(Outcome::Pass)
                }
            }

            Check::Custom(f) => f(doc),
        }
    }

    /// Short human-readable form, used when listing rules.
    pub fn summary(&self) -> String {
        match self {
            Check::Required { field } => format!("{} is present", field),
            Check::Pattern { field, regex } => format!("{} matches /{}/", field, regex.as_str()),
            Check::Range { field, min, max } => match (min, max) {
                (Some(min), Some(max)) => format!("{} <= {} <= {}", min, field, max),
                (Some(min), None) => format!("{} >= {}", field, min),
                (None, Some(max)) => format!("{} <= {}", field, max),
                (None, None) => format!("{} is a number", field),
            },
            Check::Compare { left, op, right } => format!("{} {} {}", left, op.symbol(), right),
            Check::DateOrder {
                earlier,
                later,
                strict,
            } => format!("{} {} {}", earlier, if *strict { "<" } else { "<=" }, later),
            Check::DateWithin {
                field,
                anchor,
                max_days,
            } => format!("{} - {} <= {} days", anchor, field, max_days),
            Check::Custom(_) => "custom check".to_string(),
        }
    }
}

/// A field's value, or `None` when it is absent or blank.
fn present<'d>(doc: &'d Document, field: &str) -> Result<Option<FieldValue<'d>>, CheckError> {
    Ok(doc.field(field)?.filter(|value| !value.is_blank()))
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Custom(_) => f.write_str("Custom(..)"),
            other => write!(f, "{}", other.summary()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Amount, DocumentDetails, PayslipFields};
    use crate::test_support::{bank_statement, payslip, upload_time};

    #[test]
    fn comparison_semantics() {
        assert!(Comparison::Le.holds(1.0, 1.0));
        assert!(!Comparison::Lt.holds(1.0, 1.0));
        assert!(Comparison::Ge.holds(2.0, 1.0));
        assert!(Comparison::Ne.holds(2.0, 1.0));
        assert!(Comparison::Eq.holds(0.1 + 0.2, 0.3));
    }

    #[test]
    fn required_fails_on_absent_and_blank() {
        let mut doc = payslip("P-1");
        if let DocumentDetails::Payslip(fields) = &mut doc.details {
            fields.employer_name = Some("   ".to_string());
        }
        let check = Check::required("employer_name");
        assert_eq!(check.evaluate(&doc).unwrap(), Outcome::fail());

        let check = Check::required("pay_date");
        assert_eq!(check.evaluate(&payslip("P-2")).unwrap(), Outcome::Pass);
    }

    #[test]
    fn range_reports_value() {
        let doc = bank_statement("B-1", 1000.0, -120.5);
        let check = Check::at_least("closing_balance", 0.0);
        assert_eq!(
            check.evaluate(&doc).unwrap(),
            Outcome::fail_with_value("-120.50")
        );
    }

    #[test]
    fn value_checks_skip_absent_fields() {
        let doc = Document::new(
            "P-1",
            "Ciara Walsh",
            DocumentDetails::Payslip(PayslipFields::default()),
        )
        .uploaded_at(upload_time());

        assert!(Check::at_least("gross_pay", 0.0).evaluate(&doc).unwrap().is_pass());
        assert!(
            Check::compare("net_pay", Comparison::Le, "gross_pay")
                .evaluate(&doc)
                .unwrap()
                .is_pass()
        );
        assert!(Check::not_after("pay_date", "upload_date").evaluate(&doc).unwrap().is_pass());
    }

    #[test]
    fn malformed_amount_is_check_error() {
        let mut doc = payslip("P-1");
        if let DocumentDetails::Payslip(fields) = &mut doc.details {
            fields.gross_pay = Some(Amount::from("three thousand"));
        }
        let err = Check::at_least("gross_pay", 0.0).evaluate(&doc).unwrap_err();
        assert!(matches!(err, CheckError::Field(FieldError::Malformed { .. })));
    }

    #[test]
    fn unknown_field_is_check_error() {
        let doc = bank_statement("B-1", 1.0, 1.0);
        let err = Check::required("ppsn_number").evaluate(&doc).unwrap_err();
        assert!(matches!(err, CheckError::Field(FieldError::UnknownField { .. })));
    }

    #[test]
    fn date_order_and_window() {
        let doc = bank_statement("B-1", 1.0, 1.0);
        // statement 2024-04-30, upload 2024-05-02
        assert!(
            Check::not_after("statement_date", "upload_date")
                .evaluate(&doc)
                .unwrap()
                .is_pass()
        );
        assert_eq!(
            Check::not_after("upload_date", "statement_date").evaluate(&doc).unwrap(),
            Outcome::fail_with_value("2024-05-02")
        );
        assert!(
            Check::within_days("statement_date", "upload_date", 2)
                .evaluate(&doc)
                .unwrap()
                .is_pass()
        );
        assert_eq!(
            Check::within_days("statement_date", "upload_date", 1).evaluate(&doc).unwrap(),
            Outcome::fail_with_value(2)
        );
    }

    #[test]
    fn pattern_ignores_blank_and_reports_mismatch() {
        let doc = bank_statement("B-1", 1.0, 1.0);
        let check = Check::pattern("account_number", r"^\d{8}$").unwrap();
        assert_eq!(
            check.evaluate(&doc).unwrap(),
            Outcome::fail_with_value("IE29AIBK93115212345678")
        );
    }

    #[test]
    fn custom_checks_run_closures() {
        let check = Check::custom(|doc| {
            if doc.customer_name.starts_with('A') {
                Ok(Outcome::FailWithDescription("name starts with A".to_string()))
            } else {
                Ok(Outcome::Pass)
            }
        });
        let doc = bank_statement("B-1", 1.0, 1.0);
        assert_eq!(
            check.evaluate(&doc).unwrap(),
            Outcome::FailWithDescription("name starts with A".to_string())
        );
        assert_eq!(format!("{:?}", check), "Custom(..)");
    }

    #[test]
    fn summaries_are_readable() {
        assert_eq!(Check::at_least("closing_balance", 0.0).summary(), "closing_balance >= 0");
        assert_eq!(
            Check::compare("net_pay", Comparison::Le, "gross_pay").summary(),
            "net_pay <= gross_pay"
        );
    }
}
