//! In-memory session store and its JSON persistence.

use crate::document::Document;
use crate::error::{DocvalError, Result};
use crate::fs::atomic_write_file;
use crate::validate::{ValidationEngine, ValidationResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::report::SessionReport;

/// Serializable contents of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Submitted documents in submission order.
    #[serde(default)]
    pub documents: Vec<Document>,

    /// Every validation result recorded, oldest first.
    #[serde(default)]
    pub results: Vec<ValidationResult>,
}

/// Documents submitted in a session and the results recorded for them.
///
/// All access goes through an internal mutex, so a store can be shared
/// between threads by reference.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    /// Add a document.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The document was appended
    /// * `Err(DocvalError::UserError)` - A document with the same id is already present
    pub fn add_document(&self, document: Document) -> Result<()> {
        let mut state = self.state();
        if state.documents.iter().any(|d| d.id == document.id) {
            return Err(DocvalError::UserError(format!(
                "document '{}' is already in the session\n\
                 Fix: remove it first with `docval session remove {}`.",
                document.id, document.id
            )));
        }
        debug!(document = %document.id, "added document to session");
        state.documents.push(document);
        Ok(())
    }

    /// Remove a document and every result recorded for it.
    pub fn remove_document(&self, id: &str) -> Result<Document> {
        let mut state = self.state();
        let index = state
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| {
                DocvalError::UserError(format!("document '{}' is not in the session", id))
            })?;

        let document = state.documents.remove(index);
        state.results.retain(|r| r.document_id != id);
        Ok(document)
    }

    pub fn document(&self, id: &str) -> Option<Document> {
        self.state().documents.iter().find(|d| d.id == id).cloned()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.state().documents.clone()
    }

    pub fn record_result(&self, result: ValidationResult) {
        self.state().results.push(result);
    }

    pub fn results(&self) -> Vec<ValidationResult> {
        self.state().results.clone()
    }

    /// Most recent result recorded for a document.
    pub fn latest_result(&self, id: &str) -> Option<ValidationResult> {
        self.state()
            .results
            .iter()
            .rev()
            .find(|r| r.document_id == id)
            .cloned()
    }

    /// Remove everything. Returns the number of documents removed.
    pub fn clear(&self) -> usize {
        let mut state = self.state();
        let removed = state.documents.len();
        *state = SessionState::default();
        removed
    }

    pub fn len(&self) -> usize {
        self.state().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every document and record the successful results.
    ///
    /// Documents are copied out first so the store is not locked while the
    /// engine runs. Returns one `(document id, outcome)` pair per document in
    /// session order.
    pub fn validate_documents(
        &self,
        engine: &ValidationEngine<'_>,
        workers: usize,
    ) -> Vec<(String, Result<ValidationResult>)> {
        let documents = self.documents();
        let outcomes = engine.validate_all_with_workers(&documents, workers);

        let mut state = self.state();
        documents
            .into_iter()
            .zip(outcomes)
            .map(|(doc, outcome)| {
                if let Ok(result) = &outcome {
                    state.results.push(result.clone());
                }
                (doc.id, outcome)
            })
            .collect()
    }

    /// Aggregate counts over the session.
    pub fn report(&self) -> SessionReport {
        SessionReport::from_state(&self.state())
    }

    /// Load a session file. A missing file is an empty session.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no session file, starting empty");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to read session file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let state: SessionState = serde_json::from_str(&content).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to parse session file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::from_state(state))
    }

    /// Write the session to `path` atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.state()).map_err(|e| {
            DocvalError::UserError(format!("failed to serialize session: {}", e))
        })?;
        atomic_write_file(path, &json)
    }
}
