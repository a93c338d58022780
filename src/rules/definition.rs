//! Rule definitions and issue severity.

use super::check::{Check, CheckError, Outcome};
use crate::document::Document;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::LazyLock;

/// `{name}` placeholders in rule descriptions.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("Invalid placeholder regex"));

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        })
    }
}

/// One entry of the rule catalog.
#[derive(Debug, Clone)]
pub struct RuleDefinition {
    /// Stable identifier (e.g. `BS-004`), used to disable rules in config.
    pub id: String,
    pub category: String,
    /// Issue description. May contain `{value}` (the failing value reported
    /// by the check) and `{field_name}` placeholders.
    pub description: String,
    pub severity: Severity,
    pub recommendation: String,
    pub check: Check,
}

impl RuleDefinition {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        severity: Severity,
        check: Check,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            description: String::new(),
            severity,
            recommendation: String::new(),
            check,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    pub fn evaluate(&self, doc: &Document) -> Result<Outcome, CheckError> {
        self.check.evaluate(doc)
    }

    /// Fill the description template for a failing document.
    ///
    /// Unknown placeholders are left untouched; absent fields render as
    /// `<missing>`.
    pub fn render_description(&self, doc: &Document, value: Option<&str>) -> String {
        let template = if self.description.is_empty() {
            format!("Check failed: {}", self.check.summary())
        } else {
            self.description.clone()
        };

        PLACEHOLDER
            .replace_all(&template, |caps: &Captures| {
                let name = &caps[1];
                if name == "value" {
                    return value.unwrap_or("<missing>").to_string();
                }
                match doc.field(name) {
                    Ok(Some(field)) => field.render(),
                    Ok(None) => "<missing>".to_string(),
                    Err(_) => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// JSON form used by `docval rules --format json`.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "category": self.category,
            "severity": self.severity,
            "description": self.description,
            "recommendation": self.recommendation,
            "check": self.check.summary(),
        })
    }
}
