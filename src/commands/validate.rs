//! Implementation of the `docval validate` command.

use super::CommandContext;
use super::output::{batch_verdict, print_batch};
use crate::cli::ValidateArgs;
use crate::document::{LoadedDocument, load_documents};
use crate::error::{DocvalError, Result};
use crate::rules::RuleCatalog;
use crate::validate::{BatchSummary, ValidationEngine, validate_loaded};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Execute the `docval validate` command.
///
/// # Returns
///
/// * `Ok(())` - Every document is valid
/// * `Err(DocvalError::ValidationFailed)` - At least one document has issues
/// * `Err(DocvalError::InvalidDocumentType)` - A document type has no rule set
/// * `Err(DocvalError::UserError)` - No inputs, or an input could not be loaded
pub fn cmd_validate(ctx: &CommandContext, args: ValidateArgs) -> Result<()> {
    let inputs = collect_inputs(&args.files, args.dir.as_deref(), &args.glob)?;
    if inputs.is_empty() {
        return Err(DocvalError::UserError(
            "no document files to validate\n\nFix: pass files or use --dir <path>".to_string(),
        ));
    }

    let loaded = load_inputs(&inputs);
    let catalog = RuleCatalog::from_config(&ctx.config.rules)?;
    let engine = ValidationEngine::new(&catalog);
    let workers = ctx.config.workers(args.workers);

    info!(files = inputs.len(), entries = loaded.len(), workers, "validating");
    let entries = validate_loaded(&engine, loaded, workers);
    let summary = BatchSummary::from_entries(&entries);

    print_batch(ctx.format, &entries, &summary)?;
    batch_verdict(&entries, &summary)
}

/// Load every input file, turning unreadable files into failed entries.
fn load_inputs(inputs: &[PathBuf]) -> Vec<LoadedDocument> {
    let mut loaded = Vec::new();
    for path in inputs {
        match load_documents(path) {
            Ok(entries) => loaded.extend(entries),
            Err(err) => loaded.push(LoadedDocument {
                source: path.display().to_string(),
                document: Err(err),
            }),
        }
    }
    loaded
}

/// Resolve the input file list.
///
/// Explicit files come first in the order given. Files under `dir` whose
/// forward-slash relative path matches `glob` follow in sorted order.
/// Duplicates are dropped.
pub(super) fn collect_inputs(
    files: &[PathBuf],
    dir: Option<&Path>,
    glob: &str,
) -> Result<Vec<PathBuf>> {
    let mut seen = BTreeSet::new();
    let mut inputs = Vec::new();

    for file in files {
        if seen.insert(file.clone()) {
            inputs.push(file.clone());
        }
    }

    let Some(dir) = dir else {
        return Ok(inputs);
    };

    if !dir.is_dir() {
        return Err(DocvalError::UserError(format!(
            "'{}' is not a directory\n\nFix: pass an existing directory to --dir",
            dir.display()
        )));
    }

    let globs = build_globset(glob).map_err(|e| {
        DocvalError::UserError(format!("invalid --glob pattern '{}': {}", glob, e))
    })?;

    let mut found = Vec::new();
    walk_dir(dir, &mut found)?;
    found.sort();

    for path in found {
        let relative = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        if globs.is_match(&relative) && seen.insert(path.clone()) {
            inputs.push(path);
        }
    }

    debug!(dir = %dir.display(), glob, count = inputs.len(), "collected inputs");
    Ok(inputs)
}

fn build_globset(pattern: &str) -> std::result::Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for part in pattern.split_whitespace() {
        builder.add(Glob::new(&part.replace('\\', "/"))?);
    }
    builder.build()
}

fn walk_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        DocvalError::UserError(format!("failed to read directory '{}': {}", dir.display(), e))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            DocvalError::UserError(format!("failed to read directory '{}': {}", dir.display(), e))
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, found)?;
        } else if path.is_file() {
            found.push(path);
        }
    }

    Ok(())
}
