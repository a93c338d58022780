//! Loading documents from JSON and YAML files.

use super::{Document, DocumentType};
use crate::error::{DocvalError, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// One entry read from an input file.
///
/// A malformed entry carries its error in place so that its neighbours can
/// still be validated.
#[derive(Debug)]
pub struct LoadedDocument {
    /// Where the entry came from (`path` or `path#index` for arrays).
    pub source: String,
    pub document: Result<Document>,
}

/// Load every document in a file.
///
/// The file holds either a single document object or an array of them.
/// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
///
/// # Returns
///
/// * `Ok(Vec<LoadedDocument>)` - One entry per document, each parsed independently
/// * `Err(DocvalError::UserError)` - The file could not be read or is not JSON/YAML at all
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<LoadedDocument>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        DocvalError::UserError(format!(
            "failed to read document file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let entries = parse_documents(&content, is_yaml, &path.display().to_string())?;
    debug!(path = %path.display(), count = entries.len(), "loaded document file");
    Ok(entries)
}

/// Parse documents from a string.
pub fn parse_documents(content: &str, is_yaml: bool, source: &str) -> Result<Vec<LoadedDocument>> {
    let value: Value = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| {
            DocvalError::UserError(format!("failed to parse YAML in '{}': {}", source, e))
        })?
    } else {
        serde_json::from_str(content).map_err(|e| {
            DocvalError::UserError(format!("failed to parse JSON in '{}': {}", source, e))
        })?
    };

    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| LoadedDocument {
                source: format!("{}#{}", source, index),
                document: parse_document(item),
            })
            .collect()),
        other => Ok(vec![LoadedDocument {
            source: source.to_string(),
            document: parse_document(other),
        }]),
    }
}

/// Parse one document object.
///
/// The `type` tag is resolved first so that an unsupported type is reported
/// as `InvalidDocumentType` rather than a generic parse error.
fn parse_document(mut value: Value) -> Result<Document> {
    let object = value.as_object_mut().ok_or_else(|| {
        DocvalError::UserError("document entry must be an object".to_string())
    })?;

    let type_name = match object.get("type") {
        Some(Value::String(name)) => name.clone(),
        Some(other) => {
            return Err(DocvalError::UserError(format!(
                "document 'type' must be a string, found {}",
                other
            )));
        }
        None => {
            return Err(DocvalError::UserError(
                "document is missing the 'type' field".to_string(),
            ));
        }
    };

    let doc_type: DocumentType = type_name.parse()?;
    object.insert("type".to_string(), Value::String(doc_type.tag().to_string()));

    let id = object
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<no id>")
        .to_string();

    serde_json::from_value(value).map_err(|e| {
        DocvalError::UserError(format!("failed to parse document '{}': {}", id, e))
    })
}
