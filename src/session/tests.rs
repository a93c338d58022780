//! Tests for the session store.

use super::*;
use crate::error::DocvalError;
use crate::rules::{RuleCatalog, Severity};
use crate::test_support::{bank_statement, payslip, ppsn};
use crate::validate::ValidationEngine;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn add_rejects_duplicate_ids() {
    let store = SessionStore::new();
    store.add_document(payslip("P-1")).unwrap();

    let err = store.add_document(payslip("P-1")).unwrap_err();
    assert!(matches!(err, DocvalError::UserError(_)));
    assert!(err.to_string().contains("already in the session"));
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_drops_document_and_its_results() {
    let store = SessionStore::new();
    store.add_document(payslip("P-1")).unwrap();
    store.add_document(ppsn("N-1")).unwrap();

    let engine = ValidationEngine::new(RuleCatalog::shared());
    store.validate_documents(&engine, 1);
    assert_eq!(store.results().len(), 2);

    let removed = store.remove_document("P-1").unwrap();
    assert_eq!(removed.id, "P-1");
    assert_eq!(store.len(), 1);
    assert!(store.latest_result("P-1").is_none());
    assert!(store.latest_result("N-1").is_some());

    assert!(store.remove_document("P-1").is_err());
}

#[test]
fn validate_documents_records_results_in_order() {
    let store = SessionStore::new();
    store.add_document(bank_statement("B-1", 1000.0, -50.0)).unwrap();
    store.add_document(payslip("P-1")).unwrap();

    let engine = ValidationEngine::new(RuleCatalog::shared());
    let outcomes = store.validate_documents(&engine, 2);

    let ids: Vec<_> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["B-1", "P-1"]);
    assert!(!outcomes[0].1.as_ref().unwrap().is_valid());
    assert!(outcomes[1].1.as_ref().unwrap().is_valid());

    // A second run appends, latest_result returns the newest
    store.validate_documents(&engine, 1);
    assert_eq!(store.results().len(), 4);
    let latest = store.latest_result("B-1").unwrap();
    assert_eq!(latest.issues()[0].rule_id, "BS-005");
}

#[test]
fn validate_documents_skips_recording_failures() {
    let store = SessionStore::new();
    store.add_document(payslip("P-1")).unwrap();

    let catalog = RuleCatalog::empty();
    let engine = ValidationEngine::new(&catalog);
    let outcomes = store.validate_documents(&engine, 1);

    assert!(matches!(
        outcomes[0].1,
        Err(DocvalError::InvalidDocumentType(_))
    ));
    assert!(store.results().is_empty());
}

#[test]
fn report_uses_latest_result_per_document() {
    let store = SessionStore::new();
    store.add_document(bank_statement("B-1", 1000.0, -50.0)).unwrap();
    store.add_document(payslip("P-1")).unwrap();
    store.add_document(ppsn("N-1")).unwrap();

    let engine = ValidationEngine::new(RuleCatalog::shared());
    store.validate_documents(&engine, 1);
    store.validate_documents(&engine, 1);
    store.remove_document("N-1").unwrap();
    store.add_document(ppsn("N-1")).unwrap();

    let report = store.report();
    assert_eq!(report.documents, 3);
    assert_eq!(report.validated, 2);
    assert_eq!(report.valid, 1);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.pending, 1);
    assert_eq!(report.by_severity.get(&Severity::High), Some(&1));
    assert_eq!(report.by_category.get("BalanceCheck"), Some(&1));
    assert_eq!(report.total_issues(), 1);

    let text = report.format_text();
    assert!(text.contains("Documents: 3 (1 valid, 1 invalid, 1 not validated)"));
    assert!(text.contains("Bank Statement"));
}

#[test]
fn clear_empties_the_session() {
    let store = SessionStore::new();
    store.add_document(payslip("P-1")).unwrap();
    store.record_result(
        ValidationEngine::new(RuleCatalog::shared())
            .validate(&payslip("P-1"))
            .unwrap(),
    );

    assert_eq!(store.clear(), 1);
    assert!(store.is_empty());
    assert!(store.results().is_empty());
}

#[test]
fn save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let paths = SessionPaths::new(temp.path().join(".docval"));

    let store = SessionStore::new();
    store.add_document(bank_statement("B-1", 1000.0, -50.0)).unwrap();
    store.validate_documents(&ValidationEngine::new(RuleCatalog::shared()), 1);
    store.save(paths.session_file()).unwrap();

    let loaded = SessionStore::load(paths.session_file()).unwrap();
    assert_eq!(loaded.snapshot(), store.snapshot());
    assert!(!loaded.latest_result("B-1").unwrap().is_valid());
}

#[test]
fn load_missing_file_is_empty_session() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::load(temp.path().join("session.json")).unwrap();
    assert!(store.is_empty());
}

#[test]
fn load_corrupt_file_is_user_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("session.json");
    std::fs::write(&path, "{ nope").unwrap();

    let err = SessionStore::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse session file"));
}

#[test]
fn store_is_shareable_between_threads() {
    let store = Arc::new(SessionStore::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.add_document(payslip(&format!("P-{}", i))))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(store.len(), 8);
}

#[test]
fn paths_live_in_session_dir() {
    let paths = SessionPaths::new(".docval");
    assert_eq!(paths.session_file(), std::path::Path::new(".docval/session.json"));
    assert_eq!(paths.lock_file(), std::path::Path::new(".docval/session.lock"));
    assert_eq!(paths.events_file(), std::path::Path::new(".docval/events.ndjson"));
}
