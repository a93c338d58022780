//! Shared rendering for command results.

use crate::cli::OutputFormat;
use crate::error::{DocvalError, Result};
use crate::validate::{BatchEntry, BatchSummary};
use serde_json::{Value, json};

/// Print a JSON value on stdout.
pub(super) fn print_json(value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DocvalError::UserError(format!("failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// Render a batch as text.
///
/// ```text
/// B-1 (Bank Statement, Aoife Byrne): 1 issue
///   [HIGH] BS-005 BalanceCheck: Closing balance is negative: -50.00
///          -> Review the account for overdraft and request an explanation
/// inbox/passport.json: error: invalid document type: 'Passport'
///
/// 2 documents: 0 valid, 1 invalid, 1 unsupported type, 0 failed to load
/// ```
pub(super) fn format_batch(entries: &[BatchEntry], summary: &BatchSummary) -> String {
    let mut out = String::new();

    for entry in entries {
        match &entry.outcome {
            Ok(result) => out.push_str(&result.format_report()),
            Err(err) => out.push_str(&format!("{}: error: {}\n", entry.source, err)),
        }
    }

    out.push_str(&format!(
        "\n{} document{}: {} valid, {} invalid, {} unsupported type, {} failed to load\n",
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        summary.valid,
        summary.invalid,
        summary.invalid_type,
        summary.failed
    ));

    out
}

pub(super) fn print_batch(
    format: OutputFormat,
    entries: &[BatchEntry],
    summary: &BatchSummary,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            print!("{}", format_batch(entries, summary));
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({
            "entries": entries.iter().map(BatchEntry::to_json).collect::<Vec<_>>(),
            "summary": summary.to_json(),
        })),
    }
}

/// Turn a batch outcome into the command's result.
///
/// Invalid documents map to `ValidationFailed` (exit 2); otherwise
/// unsupported types map to `InvalidDocumentType` (exit 3) and load failures
/// to `UserError` (exit 1).
pub(super) fn batch_verdict(entries: &[BatchEntry], summary: &BatchSummary) -> Result<()> {
    if summary.invalid > 0 {
        return Err(DocvalError::ValidationFailed(format!(
            "{} of {} documents have issues",
            summary.invalid, summary.total
        )));
    }

    if summary.invalid_type > 0 {
        let names: Vec<String> = entries
            .iter()
            .filter_map(|entry| match &entry.outcome {
                Err(DocvalError::InvalidDocumentType(name)) => Some(name.clone()),
                _ => None,
            })
            .collect();
        return Err(DocvalError::InvalidDocumentType(names.join("', '")));
    }

    if summary.failed > 0 {
        return Err(DocvalError::UserError(format!(
            "{} of {} entries could not be loaded",
            summary.failed, summary.total
        )));
    }

    Ok(())
}
