//! Implementation of the `docval session` subcommands.
//!
//! # Locking
//!
//! Mutating subcommands hold the session lock while they load, change, and
//! save the session file, and append their audit events before releasing it.
//! `list`, `report`, and `log` read the session files without locking.

use super::CommandContext;
use super::output::{batch_verdict, print_batch, print_json};
use crate::cli::{ForceArgs, OutputFormat, SessionAddArgs, SessionRemoveArgs, SessionValidateArgs};
use crate::document::{Document, load_documents};
use crate::error::{DocvalError, Result};
use crate::events::{Event, EventAction, append_event, read_events};
use crate::rules::RuleCatalog;
use crate::session::{SessionLock, SessionPaths, SessionStore, clear_lock};
use crate::validate::{BatchEntry, BatchSummary, ValidationEngine, ValidationResult};
use serde_json::json;
use tracing::{info, warn};

fn session_paths(ctx: &CommandContext) -> SessionPaths {
    SessionPaths::new(ctx.config.session_dir_path())
}

/// Run `f` on the session under the session lock, then save and log.
///
/// The session is saved and the events appended even when `f` reports
/// partial failures through its value.
fn with_session<T, F>(ctx: &CommandContext, action: &str, f: F) -> Result<T>
where
    F: FnOnce(&SessionStore) -> Result<(T, Vec<Event>)>,
{
    let paths = session_paths(ctx);
    let lock = SessionLock::acquire(&paths.lock_file(), action)?;

    let store = SessionStore::load(paths.session_file())?;
    let (value, events) = f(&store)?;
    store.save(paths.session_file())?;

    for event in &events {
        append_event(paths.events_file(), event)?;
    }

    lock.release()?;
    Ok(value)
}

fn require_force(args: &ForceArgs, what: &str) -> Result<()> {
    if args.force {
        return Ok(());
    }
    Err(DocvalError::UserError(format!(
        "refusing to {} without confirmation\n\nFix: rerun with --force",
        what
    )))
}

/// Short verdict for a document's latest result.
fn status_label(result: Option<&ValidationResult>) -> String {
    match result {
        None => "not validated".to_string(),
        Some(r) if r.is_valid() => "valid".to_string(),
        Some(r) => {
            let count = r.issues().len();
            let worst = r
                .highest_severity()
                .map(|s| format!(", worst {}", s))
                .unwrap_or_default();
            format!("{} issue{}{}", count, if count == 1 { "" } else { "s" }, worst)
        }
    }
}

// ============================================================================
// session add
// ============================================================================

/// Execute `docval session add`.
///
/// Every entry that loads is added; entries that fail to load or clash with
/// an existing id are reported, and the command fails after the session has
/// been saved.
pub fn cmd_session_add(ctx: &CommandContext, args: SessionAddArgs) -> Result<()> {
    let (added, failures) = with_session(ctx, "session add", |store| {
        let mut added: Vec<Document> = Vec::new();
        let mut failures: Vec<(String, DocvalError)> = Vec::new();
        let mut events = Vec::new();

        for path in &args.files {
            let entries = match load_documents(path) {
                Ok(entries) => entries,
                Err(err) => {
                    failures.push((path.display().to_string(), err));
                    continue;
                }
            };

            for entry in entries {
                let outcome = entry
                    .document
                    .and_then(|doc| store.add_document(doc.clone()).map(|_| doc));
                match outcome {
                    Ok(doc) => {
                        events.push(
                            Event::new(EventAction::SessionAdd)
                                .with_document(&doc.id)
                                .with_details(json!({
                                    "type": doc.doc_type().tag(),
                                    "source": entry.source,
                                })),
                        );
                        added.push(doc);
                    }
                    Err(err) => failures.push((entry.source, err)),
                }
            }
        }

        Ok(((added, failures), events))
    })?;

    info!(added = added.len(), failed = failures.len(), "session add");

    match ctx.format {
        OutputFormat::Text => {
            for doc in &added {
                println!("Added {} ({}, {})", doc.id, doc.doc_type(), doc.customer_name);
            }
            for (source, err) in &failures {
                println!("{}: error: {}", source, err);
            }
        }
        OutputFormat::Json => print_json(&json!({
            "added": added.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            "failed": failures
                .iter()
                .map(|(source, err)| json!({
                    "source": source,
                    "error": err.to_string(),
                    "exit_code": err.exit_code(),
                }))
                .collect::<Vec<_>>(),
        }))?,
    }

    add_verdict(failures)
}

fn add_verdict(failures: Vec<(String, DocvalError)>) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    let total = failures.len();
    let names: Vec<String> = failures
        .iter()
        .filter_map(|(_, err)| match err {
            DocvalError::InvalidDocumentType(name) => Some(name.clone()),
            _ => None,
        })
        .collect();

    if names.len() == total {
        return Err(DocvalError::InvalidDocumentType(names.join("', '")));
    }
    Err(DocvalError::UserError(format!(
        "{} entr{} could not be added",
        total,
        if total == 1 { "y" } else { "ies" }
    )))
}

// ============================================================================
// session list / report
// ============================================================================

/// Execute `docval session list`.
pub fn cmd_session_list(ctx: &CommandContext) -> Result<()> {
    let store = SessionStore::load(session_paths(ctx).session_file())?;
    let documents = store.documents();

    match ctx.format {
        OutputFormat::Text => {
            if documents.is_empty() {
                println!("Session is empty.");
                return Ok(());
            }
            for doc in &documents {
                let latest = store.latest_result(&doc.id);
                println!(
                    "{:<12} {:<14} {:<24} {}",
                    doc.id,
                    doc.doc_type().tag(),
                    doc.customer_name,
                    status_label(latest.as_ref())
                );
            }
            Ok(())
        }
        OutputFormat::Json => {
            let rows: Vec<_> = documents
                .iter()
                .map(|doc| {
                    let latest = store.latest_result(&doc.id);
                    json!({
                        "id": doc.id,
                        "type": doc.doc_type().tag(),
                        "customer_name": doc.customer_name,
                        "upload_date": doc.upload_date,
                        "status": status_label(latest.as_ref()),
                        "latest_result": latest,
                    })
                })
                .collect();
            print_json(&json!(rows))
        }
    }
}

/// Execute `docval session report`.
pub fn cmd_session_report(ctx: &CommandContext) -> Result<()> {
    let store = SessionStore::load(session_paths(ctx).session_file())?;
    let report = store.report();

    match ctx.format {
        OutputFormat::Text => {
            print!("{}", report.format_text());
            Ok(())
        }
        OutputFormat::Json => print_json(&json!(report)),
    }
}

/// Execute `docval session log`.
pub fn cmd_session_log(ctx: &CommandContext) -> Result<()> {
    let events = read_events(session_paths(ctx).events_file())?;

    match ctx.format {
        OutputFormat::Text => {
            if events.is_empty() {
                println!("No session events.");
            }
            for event in &events {
                println!("{}", format_event(event));
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&json!(events)),
    }
}

fn format_event(event: &Event) -> String {
    let mut line = format!(
        "{} {:<14} {}",
        event.ts.format("%Y-%m-%dT%H:%M:%SZ"),
        event.action.to_string(),
        event.actor
    );
    if let Some(document) = &event.document {
        line.push_str(&format!(" {}", document));
    }
    if event.details.as_object().is_some_and(|d| !d.is_empty()) {
        line.push_str(&format!(" {}", event.details));
    }
    line
}

// ============================================================================
// session remove / clear / unlock
// ============================================================================

/// Execute `docval session remove`.
pub fn cmd_session_remove(ctx: &CommandContext, args: SessionRemoveArgs) -> Result<()> {
    let removed = with_session(ctx, "session remove", |store| {
        let doc = store.remove_document(&args.id)?;
        let event = Event::new(EventAction::SessionRemove)
            .with_document(&doc.id)
            .with_details(json!({ "type": doc.doc_type().tag() }));
        Ok((doc, vec![event]))
    })?;

    match ctx.format {
        OutputFormat::Text => {
            println!("Removed {} ({})", removed.id, removed.doc_type());
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({ "removed": removed.id })),
    }
}

/// Execute `docval session clear --force`.
pub fn cmd_session_clear(ctx: &CommandContext, args: ForceArgs) -> Result<()> {
    require_force(&args, "clear the session")?;

    let removed = with_session(ctx, "session clear", |store| {
        let removed = store.clear();
        let event =
            Event::new(EventAction::SessionClear).with_details(json!({ "documents": removed }));
        Ok((removed, vec![event]))
    })?;

    match ctx.format {
        OutputFormat::Text => {
            println!(
                "Cleared session ({} document{} removed)",
                removed,
                if removed == 1 { "" } else { "s" }
            );
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({ "removed": removed })),
    }
}

/// Execute `docval session unlock --force`.
pub fn cmd_session_unlock(ctx: &CommandContext, args: ForceArgs) -> Result<()> {
    require_force(&args, "clear the session lock")?;

    let paths = session_paths(ctx);
    let info = clear_lock(&paths.lock_file(), ctx.config.lock_stale_minutes)?;
    if !info.is_stale {
        warn!(lock = %info, "cleared a lock that is not stale");
    }

    append_event(
        paths.events_file(),
        &Event::new(EventAction::LockClear).with_details(json!({
            "owner": info.metadata.owner,
            "action": info.metadata.action,
            "age": info.metadata.age_string(),
            "stale": info.is_stale,
        })),
    )?;

    match ctx.format {
        OutputFormat::Text => {
            println!("Cleared lock: {}", info);
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({
            "cleared": info.path.display().to_string(),
            "metadata": info.metadata,
            "stale": info.is_stale,
        })),
    }
}

// ============================================================================
// session validate
// ============================================================================

/// Execute `docval session validate`.
///
/// Results are appended to the session history, so earlier verdicts stay
/// available in the session file.
pub fn cmd_session_validate(ctx: &CommandContext, args: SessionValidateArgs) -> Result<()> {
    let catalog = RuleCatalog::from_config(&ctx.config.rules)?;
    let engine = ValidationEngine::new(&catalog);
    let workers = ctx.config.workers(args.workers);

    let entries = with_session(ctx, "session validate", |store| {
        let entries: Vec<BatchEntry> = store
            .validate_documents(&engine, workers)
            .into_iter()
            .map(|(id, outcome)| BatchEntry {
                source: id,
                outcome,
            })
            .collect();

        let summary = BatchSummary::from_entries(&entries);
        let event = Event::new(EventAction::Validate).with_details(json!({
            "documents": summary.total,
            "valid": summary.valid,
            "invalid": summary.invalid,
            "failed": summary.invalid_type + summary.failed,
        }));
        Ok((entries, vec![event]))
    })?;

    if entries.is_empty() && ctx.format == OutputFormat::Text {
        println!("Session is empty.");
        return Ok(());
    }

    let summary = BatchSummary::from_entries(&entries);
    print_batch(ctx.format, &entries, &summary)?;
    batch_verdict(&entries, &summary)
}
