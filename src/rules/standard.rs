//! Built-in rule sets.
//!
//! Every document type starts with the general rules (`GEN-*`), followed by
//! its own rules in a fixed order. Issue order follows this order.

use super::check::{Check, CheckError, Comparison, Outcome};
use super::definition::{RuleDefinition, Severity};
use crate::config::RulesConfig;
use crate::document::{Document, DocumentType};
use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

/// IBAN (optionally space separated) or an 8-digit domestic account number.
static ACCOUNT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Z]{2}\d{2}(?: ?[A-Z0-9]){10,30}|\d{8})$")
        .expect("Invalid account number regex")
});

static IRP_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z]{0,2}\d{6,9}$").expect("Invalid IRP number regex"));

/// Seven digits, a check character, and an optional second letter.
static PPSN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d{7}[A-W][A-IW]?$").expect("Invalid PPSN regex"));

static TAX_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("Invalid tax year regex"));

/// Build the standard rules for one document type.
pub fn standard_rules(doc_type: DocumentType, settings: &RulesConfig) -> Vec<RuleDefinition> {
    let mut rules = general_rules();
    rules.extend(match doc_type {
        DocumentType::BankStatement => bank_statement_rules(settings),
        DocumentType::Payslip => payslip_rules(settings),
        DocumentType::Irp => irp_rules(settings),
        DocumentType::Ppsn => ppsn_rules(),
        DocumentType::TaxRecord => tax_record_rules(),
    });
    rules
}

fn pattern(field: &str, regex: &LazyLock<Regex>) -> Check {
    Check::Pattern {
        field: field.to_string(),
        regex: Regex::clone(regex),
    }
}

fn general_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "GEN-001",
            "MissingField",
            Severity::High,
            Check::required("customer_name"),
        )
        .describe("Customer name is missing")
        .recommend("Record the customer's full name as it appears on the document"),
        RuleDefinition::new(
            "GEN-002",
            "DateCheck",
            Severity::Medium,
            Check::not_after("customer_dob", "upload_date"),
        )
        .describe("Date of birth {customer_dob} is after the upload date")
        .recommend("Correct the customer's date of birth"),
    ]
}

fn bank_statement_rules(settings: &RulesConfig) -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "BS-001",
            "MissingField",
            Severity::High,
            Check::required("account_number"),
        )
        .describe("Account number is missing")
        .recommend("Request a statement that shows the account number"),
        RuleDefinition::new(
            "BS-002",
            "FormatCheck",
            Severity::Medium,
            pattern("account_number", &ACCOUNT_NUMBER),
        )
        .describe("Account number is not a valid IBAN or 8-digit number: {value}")
        .recommend("Verify the account number against the original statement"),
        RuleDefinition::new(
            "BS-003",
            "MissingField",
            Severity::High,
            Check::required("statement_date"),
        )
        .describe("Statement date is missing")
        .recommend("Request a dated bank statement"),
        RuleDefinition::new(
            "BS-004",
            "MissingField",
            Severity::High,
            Check::required("closing_balance"),
        )
        .describe("Closing balance is missing")
        .recommend("Request a statement that shows the closing balance"),
        RuleDefinition::new(
            "BS-005",
            "BalanceCheck",
            Severity::High,
            Check::at_least("closing_balance", 0.0),
        )
        .describe("Closing balance is negative: {value}")
        .recommend("Review the account for overdraft and request an explanation"),
        RuleDefinition::new(
            "BS-006",
            "BalanceCheck",
            Severity::Medium,
            Check::at_least("opening_balance", 0.0),
        )
        .describe("Opening balance is negative: {value}")
        .recommend("Review the account history for the statement period"),
        RuleDefinition::new(
            "BS-007",
            "DateCheck",
            Severity::Medium,
            Check::not_after("statement_date", "upload_date"),
        )
        .describe("Statement date {statement_date} is after the upload date")
        .recommend("Check the statement date for typing errors"),
        RuleDefinition::new(
            "BS-008",
            "Recency",
            Severity::Medium,
            Check::within_days(
                "statement_date",
                "upload_date",
                i64::from(settings.statement_max_age_days),
            ),
        )
        .describe(format!(
            "Statement is {{value}} days old (limit {} days)",
            settings.statement_max_age_days
        ))
        .recommend("Request a more recent bank statement"),
    ]
}

fn payslip_rules(settings: &RulesConfig) -> Vec<RuleDefinition> {
    let max_ratio = settings.max_deduction_ratio;

    vec![
        RuleDefinition::new(
            "PS-001",
            "MissingField",
            Severity::High,
            Check::required("employer_name"),
        )
        .describe("Employer name is missing")
        .recommend("Request a payslip that names the employer"),
        RuleDefinition::new(
            "PS-002",
            "MissingField",
            Severity::High,
            Check::required("gross_pay"),
        )
        .describe("Gross pay is missing")
        .recommend("Request a payslip that shows gross pay"),
        RuleDefinition::new(
            "PS-003",
            "MissingField",
            Severity::High,
            Check::required("net_pay"),
        )
        .describe("Net pay is missing")
        .recommend("Request a payslip that shows net pay"),
        RuleDefinition::new(
            "PS-004",
            "PayCheck",
            Severity::High,
            Check::Range {
                field: "gross_pay".to_string(),
                min: Some(f64::MIN_POSITIVE),
                max: None,
            },
        )
        .describe("Gross pay must be positive: {value}")
        .recommend("Verify the gross pay figure with the employer"),
        RuleDefinition::new(
            "PS-005",
            "PayCheck",
            Severity::High,
            Check::compare("net_pay", Comparison::Le, "gross_pay"),
        )
        .describe("Net pay {value} exceeds gross pay {gross_pay}")
        .recommend("Verify the pay figures with the employer"),
        RuleDefinition::new(
            "PS-006",
            "DateCheck",
            Severity::Medium,
            Check::not_after("pay_date", "upload_date"),
        )
        .describe("Pay date {pay_date} is after the upload date")
        .recommend("Check the pay date for typing errors"),
        RuleDefinition::new(
            "PS-007",
            "Recency",
            Severity::Medium,
            Check::within_days(
                "pay_date",
                "upload_date",
                i64::from(settings.payslip_max_age_days),
            ),
        )
        .describe(format!(
            "Payslip is {{value}} days old (limit {} days)",
            settings.payslip_max_age_days
        ))
        .recommend("Request the most recent payslip"),
        RuleDefinition::new(
            "PS-008",
            "PayCheck",
            Severity::Low,
            Check::custom(move |doc| deduction_ratio(doc, max_ratio)),
        )
        .describe("Deductions exceed the expected share of gross pay")
        .recommend("Confirm the deductions with the customer"),
    ]
}

fn irp_rules(settings: &RulesConfig) -> Vec<RuleDefinition> {
    let warning_days = i64::from(settings.irp_expiry_warning_days);

    vec![
        RuleDefinition::new(
            "IRP-001",
            "MissingField",
            Severity::High,
            Check::required("irp_number"),
        )
        .describe("Residency permit number is missing")
        .recommend("Request a clear copy of the residency permit"),
        RuleDefinition::new(
            "IRP-002",
            "FormatCheck",
            Severity::Medium,
            pattern("irp_number", &IRP_NUMBER),
        )
        .describe("Residency permit number has an unexpected format: {value}")
        .recommend("Verify the permit number against the card"),
        RuleDefinition::new(
            "IRP-003",
            "MissingField",
            Severity::Medium,
            Check::required("nationality"),
        )
        .describe("Nationality is missing")
        .recommend("Record the nationality shown on the permit"),
        RuleDefinition::new(
            "IRP-004",
            "MissingField",
            Severity::High,
            Check::required("expiry_date"),
        )
        .describe("Residency permit expiry date is missing")
        .recommend("Request a copy of the permit showing the expiry date"),
        RuleDefinition::new(
            "IRP-005",
            "ExpiryCheck",
            Severity::High,
            Check::before("upload_date", "expiry_date"),
        )
        .describe("Residency permit expired on {expiry_date}")
        .recommend("Request a renewed residency permit"),
        RuleDefinition::new(
            "IRP-006",
            "ExpiryCheck",
            Severity::Low,
            Check::custom(move |doc| expiring_soon(doc, warning_days)),
        )
        .describe("Residency permit expires in {value} days")
        .recommend("Ask the customer about their renewal plans"),
    ]
}

fn ppsn_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "PPSN-001",
            "MissingField",
            Severity::High,
            Check::required("ppsn_number"),
        )
        .describe("PPSN is missing")
        .recommend("Request the customer's Personal Public Service Number"),
        RuleDefinition::new(
            "PPSN-002",
            "FormatCheck",
            Severity::High,
            pattern("ppsn_number", &PPSN_NUMBER),
        )
        .describe("PPSN must be 7 digits followed by one or two letters: {value}")
        .recommend("Verify the PPSN against official correspondence"),
        RuleDefinition::new(
            "PPSN-003",
            "ChecksumCheck",
            Severity::High,
            Check::custom(ppsn_checksum),
        )
        .describe("PPSN check character is incorrect: {value}")
        .recommend("Verify the PPSN against official correspondence"),
        RuleDefinition::new(
            "PPSN-004",
            "DateCheck",
            Severity::Low,
            Check::not_after("issue_date", "upload_date"),
        )
        .describe("PPSN issue date {issue_date} is after the upload date")
        .recommend("Check the issue date for typing errors"),
    ]
}

fn tax_record_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            "TAX-001",
            "MissingField",
            Severity::High,
            Check::required("tax_year"),
        )
        .describe("Tax year is missing")
        .recommend("Request a tax record that states the tax year"),
        RuleDefinition::new(
            "TAX-002",
            "FormatCheck",
            Severity::Medium,
            pattern("tax_year", &TAX_YEAR),
        )
        .describe("Tax year must be a four digit year: {value}")
        .recommend("Correct the tax year"),
        RuleDefinition::new(
            "TAX-003",
            "DateCheck",
            Severity::Medium,
            Check::custom(tax_year_not_in_future),
        )
        .describe("Tax year {value} is after the upload year")
        .recommend("Check the tax year for typing errors"),
        RuleDefinition::new(
            "TAX-004",
            "MissingField",
            Severity::High,
            Check::required("total_income"),
        )
        .describe("Total income is missing")
        .recommend("Request a tax record that shows total income"),
        RuleDefinition::new(
            "TAX-005",
            "IncomeCheck",
            Severity::High,
            Check::at_least("total_income", 0.0),
        )
        .describe("Total income is negative: {value}")
        .recommend("Verify the income figure with Revenue records"),
        RuleDefinition::new(
            "TAX-006",
            "TaxCheck",
            Severity::Medium,
            Check::at_least("tax_paid", 0.0),
        )
        .describe("Tax paid is negative: {value}")
        .recommend("Verify the tax paid figure with Revenue records"),
        RuleDefinition::new(
            "TAX-007",
            "TaxCheck",
            Severity::High,
            Check::compare("tax_paid", Comparison::Le, "total_income"),
        )
        .describe("Tax paid {value} exceeds total income {total_income}")
        .recommend("Verify the tax record figures"),
    ]
}

// ============================================================================
// Custom checks
// ============================================================================

fn deduction_ratio(doc: &Document, max_ratio: f64) -> Result<Outcome, CheckError> {
    let (Some(gross), Some(net)) = (doc.field("gross_pay")?, doc.field("net_pay")?) else {
        return Ok(Outcome::Pass);
    };
    let gross = gross.to_amount("gross_pay")?;
    let net = net.to_amount("net_pay")?;

    // Non-positive gross pay is reported by the gross pay rule.
    if gross <= 0.0 {
        return Ok(Outcome::Pass);
    }

    let ratio = (gross - net) / gross;
    if ratio > max_ratio {
        Ok(Outcome::FailWithDescription(format!(
            "Deductions are {:.0}% of gross pay (limit {:.0}%)",
            ratio * 100.0,
            max_ratio * 100.0
        )))
    } else {
        Ok(Outcome::Pass)
    }
}

fn expiring_soon(doc: &Document, warning_days: i64) -> Result<Outcome, CheckError> {
    let Some(expiry) = doc.field("expiry_date")? else {
        return Ok(Outcome::Pass);
    };
    let days = (expiry.to_date("expiry_date")? - doc.upload_date.date_naive()).num_days();

    // Expired permits are reported by the expiry rule.
    if days > 0 && days <= warning_days {
        Ok(Outcome::fail_with_value(days))
    } else {
        Ok(Outcome::Pass)
    }
}

fn ppsn_checksum(doc: &Document) -> Result<Outcome, CheckError> {
    let Some(value) = doc.field("ppsn_number")? else {
        return Ok(Outcome::Pass);
    };
    let number = value.as_text("ppsn_number")?.trim().to_ascii_uppercase();

    // Malformed numbers are reported by the format rule.
    if !PPSN_NUMBER.is_match(&number) {
        return Ok(Outcome::Pass);
    }

    match ppsn_check_character(&number) {
        Some(expected) if number.as_bytes()[7] == expected as u8 => Ok(Outcome::Pass),
        _ => Ok(Outcome::fail_with_value(number)),
    }
}

/// Compute the expected check character of a PPSN.
///
/// Digits are weighted 8 down to 2 and an optional second letter is weighted
/// 9 (`W` counts as 0). The sum modulo 23 maps to `A`..`V`, with 0 mapping
/// to `W`.
///
/// Returns `None` when `number` is not seven ASCII digits followed by a
/// check character and at most one second letter in `A`..=`I` or `W`.
pub fn ppsn_check_character(number: &str) -> Option<char> {
    let bytes = number.as_bytes();
    if !(8..=9).contains(&bytes.len()) || !bytes[..7].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let mut sum: u32 = bytes[..7]
        .iter()
        .zip((2..=8).rev())
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();

    if let Some(&second) = bytes.get(8) {
        match second.to_ascii_uppercase() {
            b'W' => {}
            letter @ b'A'..=b'I' => sum += u32::from(letter - b'A' + 1) * 9,
            _ => return None,
        }
    }

    match sum % 23 {
        0 => Some('W'),
        rem => Some(char::from(b'A' + rem as u8 - 1)),
    }
}

fn tax_year_not_in_future(doc: &Document) -> Result<Outcome, CheckError> {
    let Some(value) = doc.field("tax_year")? else {
        return Ok(Outcome::Pass);
    };
    let text = value.as_text("tax_year")?.trim();

    // Non-numeric years are reported by the format rule.
    let Ok(year) = text.parse::<i32>() else {
        return Ok(Outcome::Pass);
    };

    if year > doc.upload_date.year() {
        Ok(Outcome::fail_with_value(year))
    } else {
        Ok(Outcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentDetails, PpsnFields};
    use crate::test_support::{irp, payslip, ppsn, tax_record, upload_time};

    fn ids(rules: &[RuleDefinition]) -> Vec<&str> {
        rules.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn general_rules_come_first_for_every_type() {
        let settings = RulesConfig::default();
        for doc_type in DocumentType::ALL {
            let rules = standard_rules(doc_type, &settings);
            assert_eq!(&ids(&rules)[..2], &["GEN-001", "GEN-002"], "{}", doc_type);
            assert!(rules.len() > 2);
        }
    }

    #[test]
    fn rule_ids_are_unique_across_types() {
        let settings = RulesConfig::default();
        let mut seen = std::collections::BTreeSet::new();
        for doc_type in DocumentType::ALL {
            for rule in standard_rules(doc_type, &settings).into_iter().skip(2) {
                assert!(seen.insert(rule.id.clone()), "duplicate id {}", rule.id);
            }
        }
    }

    #[test]
    fn check_fields_belong_to_their_type() {
        let settings = RulesConfig::default();
        for doc_type in DocumentType::ALL {
            for rule in standard_rules(doc_type, &settings) {
                if let Check::Required { field } | Check::Pattern { field, .. } = &rule.check {
                    assert!(doc_type.has_field(field), "{} reads {}", rule.id, field);
                }
            }
        }
    }

    #[test]
    fn ppsn_check_character_examples() {
        assert_eq!(ppsn_check_character("1234567T"), Some('T'));
        assert_eq!(ppsn_check_character("1234567FA"), Some('F'));
        assert_eq!(ppsn_check_character("1234567TW"), Some('T'));
        assert_eq!(ppsn_check_character("12345"), None);
        assert_eq!(ppsn_check_character("12A4567T"), None);
    }

    #[test]
    fn ppsn_check_character_rejects_bad_second_character() {
        assert_eq!(ppsn_check_character("1234567T1"), None);
        assert_eq!(ppsn_check_character("1234567T "), None);
        assert_eq!(ppsn_check_character("1234567TZ"), None);
        assert_eq!(ppsn_check_character("1234567TAA"), None);
    }

    #[test]
    fn ppsn_checksum_flags_wrong_letter() {
        let doc = ppsn("P-1");
        assert!(ppsn_checksum(&doc).unwrap().is_pass());

        let mut doc = ppsn("P-2");
        doc.details = DocumentDetails::Ppsn(PpsnFields {
            ppsn_number: Some("1234567b".to_string()),
            issue_date: None,
        });
        assert_eq!(
            ppsn_checksum(&doc).unwrap(),
            Outcome::fail_with_value("1234567B")
        );
    }

    #[test]
    fn ppsn_checksum_defers_malformed_numbers() {
        let mut doc = ppsn("P-1");
        doc.details = DocumentDetails::Ppsn(PpsnFields {
            ppsn_number: Some("12-34".to_string()),
            issue_date: None,
        });
        assert!(ppsn_checksum(&doc).unwrap().is_pass());
    }

    #[test]
    fn deduction_ratio_uses_threshold() {
        let doc = payslip("P-1");
        // gross 3000, net 2400: 20% deductions
        assert!(deduction_ratio(&doc, 0.6).unwrap().is_pass());
        assert_eq!(
            deduction_ratio(&doc, 0.1).unwrap(),
            Outcome::FailWithDescription(
                "Deductions are 20% of gross pay (limit 10%)".to_string()
            )
        );
    }

    #[test]
    fn expiring_soon_window() {
        let doc = irp("I-1").uploaded_at(
            chrono::NaiveDate::from_ymd_opt(2025, 9, 10)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
                .and_utc(),
        );
        // expiry 2025-09-30
        assert_eq!(expiring_soon(&doc, 30).unwrap(), Outcome::fail_with_value(20));
        assert!(expiring_soon(&doc, 10).unwrap().is_pass());
        assert!(expiring_soon(&irp("I-2"), 30).unwrap().is_pass());
    }

    #[test]
    fn tax_year_after_upload_year_fails() {
        let doc = tax_record("T-1");
        assert!(tax_year_not_in_future(&doc).unwrap().is_pass());

        let future = tax_record("T-2").uploaded_at(
            upload_time() - chrono::Duration::days(365 * 2),
        );
        assert_eq!(
            tax_year_not_in_future(&future).unwrap(),
            Outcome::fail_with_value(2023)
        );
    }

    #[test]
    fn thresholds_flow_into_descriptions() {
        let settings = RulesConfig {
            statement_max_age_days: 14,
            ..Default::default()
        };
        let rules = standard_rules(DocumentType::BankStatement, &settings);
        let recency = rules.iter().find(|r| r.id == "BS-008").unwrap();
        assert_eq!(recency.description, "Statement is {value} days old (limit 14 days)");
    }
}
