//! Aggregate session summary.

use super::store::SessionState;
use crate::document::DocumentType;
use crate::rules::Severity;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts over the documents of a session, using each document's latest result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub documents: usize,
    pub validated: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Documents with no recorded result.
    pub pending: usize,
    pub by_type: BTreeMap<DocumentType, usize>,
    /// Issues of the latest results, per severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Issues of the latest results, per category.
    pub by_category: BTreeMap<String, usize>,
}

impl SessionReport {
    pub(super) fn from_state(state: &SessionState) -> Self {
        let mut report = SessionReport {
            documents: state.documents.len(),
            ..Default::default()
        };

        for doc in &state.documents {
            *report.by_type.entry(doc.doc_type()).or_insert(0) += 1;

            let latest = state.results.iter().rev().find(|r| r.document_id == doc.id);
            let Some(result) = latest else {
                report.pending += 1;
                continue;
            };

            report.validated += 1;
            if result.is_valid() {
                report.valid += 1;
            } else {
                report.invalid += 1;
            }
            for issue in result.issues() {
                *report.by_severity.entry(issue.severity).or_insert(0) += 1;
                *report.by_category.entry(issue.category.clone()).or_insert(0) += 1;
            }
        }

        report
    }

    pub fn total_issues(&self) -> usize {
        self.by_severity.values().sum()
    }

    /// Plain-text rendering for `docval session report`.
    pub fn format_text(&self) -> String {
        let mut out = format!(
            "Documents: {} ({} valid, {} invalid, {} not validated)\n",
            self.documents, self.valid, self.invalid, self.pending
        );

        if !self.by_type.is_empty() {
            out.push_str("\nBy type:\n");
            for (doc_type, count) in &self.by_type {
                out.push_str(&format!("  {:<32} {}\n", doc_type.display_name(), count));
            }
        }

        out.push_str(&format!("\nIssues: {}\n", self.total_issues()));
        for (severity, count) in &self.by_severity {
            out.push_str(&format!("  {:<8} {}\n", severity.to_string(), count));
        }
        if !self.by_category.is_empty() {
            out.push_str("\nBy category:\n");
            for (category, count) in &self.by_category {
                out.push_str(&format!("  {:<20} {}\n", category, count));
            }
        }

        out
    }
}
