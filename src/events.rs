//! Session audit log.
//!
//! Every session mutation appends one JSON object per line to
//! `<session_dir>/events.ndjson`.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (`session_add`, `validate`, ...)
//! - `actor`: the owner string (e.g. `user@HOST`)
//! - `document`: optional document id for document-specific events
//! - `details`: freeform object with action-specific details
//!
//! Events are appended while the session lock is held, so the log and the
//! session file move together.

use crate::error::{DocvalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Document added to the session
    SessionAdd,
    /// Document removed from the session
    SessionRemove,
    /// Session documents validated
    Validate,
    /// Session emptied
    SessionClear,
    /// Session lock cleared manually
    LockClear,
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventAction::SessionAdd => write!(f, "session_add"),
            EventAction::SessionRemove => write!(f, "session_remove"),
            EventAction::Validate => write!(f, "validate"),
            EventAction::SessionClear => write!(f, "session_clear"),
            EventAction::LockClear => write!(f, "lock_clear"),
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// Who performed the action (e.g. `user@HOST`).
    pub actor: String,

    /// Document id for document-specific events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    #[serde(default)]
    pub details: Value,
}

impl Event {
    /// Create an event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            document: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document = Some(document_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            DocvalError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// `user@host` for the current process.
pub(crate) fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to an NDJSON log, creating the file if needed.
///
/// The file is synced after every append.
///
/// # Returns
///
/// * `Ok(())` - The event is on disk
/// * `Err(DocvalError::UserError)` - Serialization or write failed
pub fn append_event<P: AsRef<Path>>(path: P, event: &Event) -> Result<()> {
    let path = path.as_ref();
    let line = event.to_ndjson_line()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            DocvalError::UserError(format!(
                "failed to create events directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            DocvalError::UserError(format!(
                "failed to open events file '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", line).map_err(|e| {
        DocvalError::UserError(format!(
            "failed to write event to '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        DocvalError::UserError(format!(
            "failed to sync events file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Read every event from an NDJSON log. A missing file is an empty log.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        DocvalError::UserError(format!(
            "failed to read events file '{}': {}",
            path.display(),
            e
        ))
    })?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                DocvalError::UserError(format!(
                    "invalid event on line {} of '{}': {}",
                    index + 1,
                    path.display(),
                    e
                ))
            })
        })
        .collect()
}
