//! The rule catalog: ordered rule sets keyed by document type.

use super::compile::compile_custom_rule;
use super::definition::RuleDefinition;
use super::standard::standard_rules;
use crate::config::RulesConfig;
use crate::document::DocumentType;
use crate::error::{DocvalError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::{debug, warn};

static SHARED: LazyLock<RuleCatalog> =
    LazyLock::new(|| RuleCatalog::standard(&RulesConfig::default()));

/// Read-only mapping from document type to its ordered rules.
///
/// Built once at startup and shared by reference afterwards.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: BTreeMap<DocumentType, Vec<RuleDefinition>>,
}

impl RuleCatalog {
    /// A catalog with no rule sets. Every lookup fails until rules are added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in rule sets with the given thresholds.
    pub fn standard(settings: &RulesConfig) -> Self {
        let rules = DocumentType::ALL
            .into_iter()
            .map(|doc_type| (doc_type, standard_rules(doc_type, settings)))
            .collect();
        Self { rules }
    }

    /// The built-in rule sets adjusted by configuration.
    ///
    /// Disabled rules are removed, then custom rules are appended after the
    /// built-in rules of their document type, in configuration order.
    ///
    /// # Returns
    ///
    /// * `Ok(RuleCatalog)` - The adjusted catalog
    /// * `Err(DocvalError::UserError)` - A custom rule failed to compile or
    ///   reuses a built-in rule id
    pub fn from_config(settings: &RulesConfig) -> Result<Self> {
        let mut catalog = Self::standard(settings);

        let builtin: BTreeSet<String> = catalog.ids().map(str::to_string).collect();

        let disabled: BTreeSet<&str> = settings.disabled.iter().map(String::as_str).collect();
        for id in &disabled {
            if !builtin.contains(*id) {
                warn!(rule = %id, "disabled rule id does not match any built-in rule");
            }
        }
        for rules in catalog.rules.values_mut() {
            rules.retain(|rule| !disabled.contains(rule.id.as_str()));
        }

        for spec in &settings.custom {
            if builtin.contains(&spec.id) {
                return Err(DocvalError::UserError(format!(
                    "custom rule id '{}' clashes with a built-in rule\n\
                     Fix: choose a different id, or disable the built-in rule and use a new id.",
                    spec.id
                )));
            }
            let (doc_type, rule) = compile_custom_rule(spec)?;
            debug!(rule = %rule.id, document_type = %doc_type, "registered custom rule");
            catalog.push(doc_type, rule);
        }

        Ok(catalog)
    }

    /// Process-wide catalog with the default thresholds.
    pub fn shared() -> &'static RuleCatalog {
        &SHARED
    }

    /// Replace the rule set of one document type.
    pub fn with_rules(mut self, doc_type: DocumentType, rules: Vec<RuleDefinition>) -> Self {
        self.rules.insert(doc_type, rules);
        self
    }

    /// Append a rule to the end of a document type's rule set.
    pub fn push(&mut self, doc_type: DocumentType, rule: RuleDefinition) {
        self.rules.entry(doc_type).or_default().push(rule);
    }

    /// Ordered rules for a document type.
    ///
    /// # Returns
    ///
    /// * `Ok(&[RuleDefinition])` - Rules in evaluation order
    /// * `Err(DocvalError::InvalidDocumentType)` - The catalog has no rule set for the type
    pub fn rules_for(&self, doc_type: DocumentType) -> Result<&[RuleDefinition]> {
        self.rules
            .get(&doc_type)
            .map(Vec::as_slice)
            .ok_or_else(|| DocvalError::InvalidDocumentType(doc_type.tag().to_string()))
    }

    /// Ordered rules for a document type given by name.
    pub fn rules_for_name(&self, name: &str) -> Result<&[RuleDefinition]> {
        self.rules_for(name.parse()?)
    }

    /// Document types that have a rule set.
    pub fn document_types(&self) -> impl Iterator<Item = DocumentType> + '_ {
        self.rules.keys().copied()
    }

    /// Find a rule by id.
    pub fn find(&self, id: &str) -> Option<(DocumentType, &RuleDefinition)> {
        self.rules.iter().find_map(|(doc_type, rules)| {
            rules
                .iter()
                .find(|rule| rule.id == id)
                .map(|rule| (*doc_type, rule))
        })
    }

    /// Total number of rules across all document types.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.values().flatten().map(|rule| rule.id.as_str())
    }
}
