//! Tests for the validation engine.

use super::*;
use crate::document::{
    Amount, Document, DocumentDetails, DocumentType, PayslipFields, PpsnFields, parse_documents,
};
use crate::error::DocvalError;
use crate::exit_codes;
use crate::rules::{Check, CheckError, Outcome, RuleCatalog, RuleDefinition, Severity};
use crate::test_support::{bank_statement, irp, payslip, ppsn, tax_record, upload_time};

fn engine() -> ValidationEngine<'static> {
    ValidationEngine::new(RuleCatalog::shared())
}

fn issue_ids(result: &ValidationResult) -> Vec<&str> {
    result.issues().iter().map(|i| i.rule_id.as_str()).collect()
}

#[test]
fn clean_documents_are_valid() {
    let docs = [
        bank_statement("B-1", 1000.0, 1200.0),
        payslip("P-1"),
        irp("I-1"),
        ppsn("N-1"),
        tax_record("T-1"),
    ];
    for doc in &docs {
        let result = engine().validate(doc).unwrap();
        assert!(result.is_valid(), "{}: {:?}", doc.id, result.issues());
        assert!(result.issues().is_empty());
        assert_eq!(result.document_id, doc.id);
        assert_eq!(result.document_type, doc.doc_type());
        assert_eq!(result.customer_name, doc.customer_name);
    }
}

#[test]
fn negative_closing_balance_yields_one_high_balance_issue() {
    let doc = bank_statement("B-1", 1000.0, -50.0);
    let result = engine().validate(&doc).unwrap();

    assert!(!result.is_valid());
    assert_eq!(result.issues().len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.rule_id, "BS-005");
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.category, "BalanceCheck");
    assert_eq!(issue.description, "Closing balance is negative: -50.00");
}

#[test]
fn ppsn_without_number_reports_only_missing_field() {
    let mut doc = ppsn("N-1");
    doc.details = DocumentDetails::Ppsn(PpsnFields {
        ppsn_number: None,
        issue_date: Some("2015-03-10".to_string()),
    });

    let result = engine().validate(&doc).unwrap();
    assert_eq!(issue_ids(&result), vec!["PPSN-001"]);
    assert_eq!(result.issues()[0].category, "MissingField");
    assert!(result.issues().iter().all(|i| !i.rule_id.starts_with("PS-")));
}

#[test]
fn issues_follow_catalog_order() {
    let catalog = RuleCatalog::empty().with_rules(
        DocumentType::Payslip,
        vec![
            RuleDefinition::new("R-1", "A", Severity::Low, Check::custom(|_| Ok(Outcome::fail()))),
            RuleDefinition::new("R-2", "B", Severity::High, Check::required("employer_name")),
            RuleDefinition::new(
                "R-3",
                "C",
                Severity::Medium,
                Check::custom(|_| Ok(Outcome::fail_with_value("x"))),
            ),
        ],
    );
    let engine = ValidationEngine::new(&catalog);

    let result = engine.validate(&payslip("P-1")).unwrap();
    assert_eq!(issue_ids(&result), vec!["R-1", "R-3"]);
    assert_eq!(result.issues()[0].severity, Severity::Low);
    assert_eq!(result.issues()[1].severity, Severity::Medium);
}

#[test]
fn issue_count_matches_failing_checks() {
    let mut doc = bank_statement("B-1", -10.0, -20.0);
    if let DocumentDetails::BankStatement(fields) = &mut doc.details {
        fields.account_number = Some("12 34".to_string());
        fields.statement_date = Some("2023-01-01".to_string());
    }

    let rules = RuleCatalog::shared().rules_for(doc.doc_type()).unwrap();
    let failing = rules
        .iter()
        .filter(|rule| !rule.evaluate(&doc).unwrap().is_pass())
        .count();

    let result = engine().validate(&doc).unwrap();
    assert_eq!(result.issues().len(), failing);
    assert_eq!(issue_ids(&result), vec!["BS-002", "BS-005", "BS-006", "BS-008"]);
}

#[test]
fn malformed_amount_becomes_data_integrity_issue() {
    let mut doc = bank_statement("B-1", 0.0, 100.0);
    if let DocumentDetails::BankStatement(fields) = &mut doc.details {
        fields.opening_balance = Some(Amount::from("lots"));
        fields.statement_date = Some("2024-06-01".to_string());
    }

    let result = engine().validate(&doc).unwrap();
    assert_eq!(issue_ids(&result), vec!["BS-006", "BS-007"]);

    let integrity = &result.issues()[0];
    assert_eq!(integrity.severity, Severity::High);
    assert_eq!(integrity.category, DATA_INTEGRITY_CATEGORY);
    assert!(integrity.is_data_integrity());
    assert!(integrity.description.contains("opening_balance"));

    assert_eq!(result.issues()[1].category, "DateCheck");
}

#[test]
fn custom_check_error_is_recorded_and_later_rules_run() {
    let catalog = RuleCatalog::empty().with_rules(
        DocumentType::Payslip,
        vec![
            RuleDefinition::new(
                "R-1",
                "PayCheck",
                Severity::Low,
                Check::custom(|_| Ok(Outcome::fail())),
            )
            .describe("first"),
            RuleDefinition::new(
                "R-2",
                "PayCheck",
                Severity::Low,
                Check::custom(|_| Err(CheckError::Custom("payroll lookup failed".to_string()))),
            ),
            RuleDefinition::new(
                "R-3",
                "PayCheck",
                Severity::Medium,
                Check::custom(|_| Ok(Outcome::fail())),
            )
            .describe("third"),
        ],
    );

    let result = ValidationEngine::new(&catalog).validate(&payslip("P-1")).unwrap();
    assert_eq!(issue_ids(&result), vec!["R-1", "R-2", "R-3"]);

    let integrity = &result.issues()[1];
    assert_eq!(integrity.severity, Severity::High, "rule severity is overridden");
    assert_eq!(integrity.category, DATA_INTEGRITY_CATEGORY);
    assert_eq!(
        integrity.description,
        "Rule R-2 could not be evaluated: payroll lookup failed"
    );
    assert_eq!(result.issues()[2].description, "third");
}

#[test]
fn malformed_date_becomes_data_integrity_issue() {
    let mut doc = payslip("P-1");
    doc.details = DocumentDetails::Payslip(PayslipFields {
        employer_name: Some("Acme Ltd".to_string()),
        gross_pay: Some(Amount::from(3000.0)),
        net_pay: Some(Amount::from(3500.0)),
        pay_date: Some("31st of April".to_string()),
    });

    let result = engine().validate(&doc).unwrap();
    assert_eq!(issue_ids(&result), vec!["PS-005", "PS-006", "PS-007"]);
    assert_eq!(result.issues()[0].category, "PayCheck");
    for issue in &result.issues()[1..] {
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.is_data_integrity());
        assert!(issue.description.contains("pay_date"));
    }
}

#[test]
fn missing_rule_set_is_invalid_document_type() {
    let catalog = RuleCatalog::empty();
    let err = ValidationEngine::new(&catalog).validate(&payslip("P-1")).unwrap_err();
    assert!(matches!(err, DocvalError::InvalidDocumentType(_)));
}

#[test]
fn validation_is_repeatable() {
    let doc = bank_statement("B-1", 1000.0, -50.0);
    let before = doc.clone();

    let first = engine().validate(&doc).unwrap();
    let second = engine().validate(&doc).unwrap();

    assert_eq!(first.issues(), second.issues());
    assert_eq!(doc, before);
}

fn batch() -> Vec<Document> {
    let mut docs = Vec::new();
    for i in 0..7 {
        docs.push(bank_statement(&format!("B-{}", i), 100.0, if i % 2 == 0 { 5.0 } else { -5.0 }));
        docs.push(payslip(&format!("P-{}", i)));
    }
    docs
}

#[test]
fn validate_all_preserves_order_and_isolates_failures() {
    let catalog = RuleCatalog::standard(&Default::default());
    let bank_only = RuleCatalog::empty().with_rules(
        DocumentType::BankStatement,
        catalog.rules_for(DocumentType::BankStatement).unwrap().to_vec(),
    );
    let engine = ValidationEngine::new(&bank_only);
    let docs = batch();

    let results = engine.validate_all(&docs);
    assert_eq!(results.len(), docs.len());

    for (doc, result) in docs.iter().zip(&results) {
        match doc.doc_type() {
            DocumentType::BankStatement => {
                assert_eq!(result.as_ref().unwrap().document_id, doc.id);
            }
            _ => assert!(matches!(result, Err(DocvalError::InvalidDocumentType(_)))),
        }
    }
}

#[test]
fn worker_pool_matches_sequential_results() {
    let docs = batch();
    let sequential = engine().validate_all(&docs);

    for workers in [0, 1, 2, 3, 16] {
        let parallel = engine().validate_all_with_workers(&docs, workers);
        assert_eq!(parallel.len(), sequential.len());
        for (a, b) in sequential.iter().zip(&parallel) {
            let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
            assert_eq!(a.document_id, b.document_id);
            assert_eq!(a.issues(), b.issues());
        }
    }
}

#[test]
fn validate_all_handles_empty_batch() {
    assert!(engine().validate_all(&[]).is_empty());
    assert!(engine().validate_all_with_workers(&[], 4).is_empty());
}

#[test]
fn validation_date_is_recent() {
    let result = engine().validate(&payslip("P-1")).unwrap();
    assert!(result.validation_date > upload_time());
}

const MIXED: &str = r#"[
    {
        "id": "B-1",
        "type": "Bank Statement",
        "customer_name": "Aoife Byrne",
        "upload_date": "2024-05-02T09:30:00Z",
        "account_number": "12345678",
        "opening_balance": 1000,
        "closing_balance": -50,
        "statement_date": "2024-04-30"
    },
    {
        "id": "X-1",
        "type": "Passport",
        "customer_name": "Nobody",
        "upload_date": "2024-05-02T09:30:00Z"
    },
    {
        "id": "P-1",
        "type": "payslip",
        "customer_name": "Ciara Walsh",
        "upload_date": "2024-05-02T09:30:00Z",
        "employer_name": "Acme Ltd",
        "gross_pay": "3,000.00",
        "net_pay": 2400,
        "pay_date": "2024-04-26"
    },
    "not a document"
]"#;

#[test]
fn loaded_batches_keep_failures_in_place() {
    let loaded = parse_documents(MIXED, false, "mixed.json").unwrap();
    let entries = validate_loaded(&engine(), loaded, 2);

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].source, "mixed.json#0");
    assert!(!entries[0].outcome.as_ref().unwrap().is_valid());
    assert!(matches!(
        entries[1].outcome,
        Err(DocvalError::InvalidDocumentType(_))
    ));
    assert!(entries[2].outcome.as_ref().unwrap().is_valid());
    assert!(matches!(entries[3].outcome, Err(DocvalError::UserError(_))));

    let summary = BatchSummary::from_entries(&entries);
    assert_eq!(
        summary,
        BatchSummary {
            total: 4,
            valid: 1,
            invalid: 1,
            invalid_type: 1,
            failed: 1,
        }
    );
    assert_eq!(summary.exit_code(), exit_codes::VALIDATION_FAILURE);

    let json = entries[1].to_json();
    assert_eq!(json["exit_code"], exit_codes::INVALID_DOCUMENT_TYPE);
}

#[test]
fn batch_exit_code_precedence() {
    let mut summary = BatchSummary {
        total: 2,
        valid: 1,
        invalid_type: 1,
        ..Default::default()
    };
    assert_eq!(summary.exit_code(), exit_codes::INVALID_DOCUMENT_TYPE);

    summary.invalid_type = 0;
    summary.valid = 2;
    assert_eq!(summary.exit_code(), exit_codes::SUCCESS);

    summary.failed = 1;
    assert_eq!(summary.exit_code(), exit_codes::USER_ERROR);
}
